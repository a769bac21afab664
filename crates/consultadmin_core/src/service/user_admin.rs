//! User administration and directory search use-cases.
//!
//! # Responsibility
//! - Create, update and delete accounts through `AccountStore`.
//! - Answer listing and search queries by combining `AccountStore`
//!   membership lookups with `DirectoryQuery` joins.
//!
//! # Invariants
//! - Unknown account ids yield exactly one `UserNotFound` error and cause
//!   no writes.
//! - Account deletion strips every held role first and is skipped when
//!   any removal fails; successful removals are not rolled back.
//! - Multi-role listings contain each account at most once, in
//!   first-seen order.

use crate::model::account::{Account, AccountWithCompany};
use crate::model::company::{Company, CompanyActivity, CompanyId};
use crate::model::outcome::{Outcome, OutcomeError};
use crate::model::request::{CreateUserRequest, UpdateUserRequest};
use crate::model::role::Role;
use crate::repo::account_store::AccountStore;
use crate::repo::directory_repo::DirectoryQuery;
use crate::repo::role_store::RoleStore;
use crate::repo::RepoResult;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

/// Account lifecycle and query service over injected stores.
pub struct UserAdmin<A: AccountStore, R: RoleStore, D: DirectoryQuery> {
    accounts: A,
    roles: R,
    directory: D,
}

impl<A: AccountStore, R: RoleStore, D: DirectoryQuery> UserAdmin<A, R, D> {
    pub fn new(accounts: A, roles: R, directory: D) -> Self {
        Self {
            accounts,
            roles,
            directory,
        }
    }

    pub fn get_all_users(&self) -> RepoResult<Vec<Account>> {
        self.directory.list_accounts()
    }

    pub fn get_all_users_with_company(&self) -> RepoResult<Vec<AccountWithCompany>> {
        self.directory.list_accounts_with_company()
    }

    pub fn get_user_by_id(&self, id: &str) -> RepoResult<Option<Account>> {
        self.accounts.find_by_id(id)
    }

    /// Registers a new account; the email doubles as the user name.
    pub fn create_user(&self, request: &CreateUserRequest) -> RepoResult<Outcome> {
        let mut account = Account::new(request.email.clone(), request.email.clone())
            .named(request.first_name.clone(), request.last_name.clone());
        account.company_id = request.company_id;

        let outcome = self.accounts.create(&account, &request.password)?;
        log_outcome("user_create", &account.id, &outcome);
        Ok(outcome)
    }

    /// Replaces the name fields of an existing account.
    pub fn update_user(&self, request: &UpdateUserRequest) -> RepoResult<Outcome> {
        let Some(mut account) = self.accounts.find_by_id(&request.id)? else {
            warn!(
                "event=user_update module=service status=not_found account_id={}",
                request.id
            );
            return Ok(Outcome::failed_with(OutcomeError::user_not_found(
                &request.id,
            )));
        };

        account.first_name = request.first_name.clone();
        account.last_name = request.last_name.clone();
        let outcome = self.accounts.update(&account)?;
        log_outcome("user_update", &account.id, &outcome);
        Ok(outcome)
    }

    /// Strips every role held by the account, then deletes it.
    pub fn delete_user(&self, id: &str) -> RepoResult<Outcome> {
        let Some(account) = self.accounts.find_by_id(id)? else {
            warn!("event=user_delete module=service status=not_found account_id={id}");
            return Ok(Outcome::failed_with(OutcomeError::user_not_found(id)));
        };

        let held = self.accounts.get_roles(&account)?;
        let mut removal_errors = Vec::new();
        for role_name in &held {
            let removed = self.accounts.remove_role(&account, role_name)?;
            if !removed.succeeded {
                removal_errors.extend(removed.errors);
            }
        }

        if !removal_errors.is_empty() {
            warn!(
                "event=user_delete module=service status=error account_id={} held_roles={} failed_removals={}",
                account.id,
                held.len(),
                removal_errors.len()
            );
            return Ok(Outcome::failed(removal_errors));
        }

        let outcome = self.accounts.delete(&account)?;
        log_outcome("user_delete", &account.id, &outcome);
        Ok(outcome)
    }

    /// Grants `role_name` to the account identified by `user_id`.
    pub fn assign_role(&self, user_id: &str, role_name: &str) -> RepoResult<Outcome> {
        let Some(account) = self.accounts.find_by_id(user_id)? else {
            return Ok(Outcome::failed_with(OutcomeError::user_not_found(user_id)));
        };
        let outcome = self.accounts.assign_role(&account, role_name)?;
        log_outcome("user_role_assign", &account.id, &outcome);
        Ok(outcome)
    }

    pub fn get_all_roles(&self) -> RepoResult<Vec<Role>> {
        self.roles.roles()
    }

    pub fn get_role_by_id(&self, id: &str) -> RepoResult<Option<Role>> {
        self.roles.find_by_id(id)
    }

    pub fn get_all_activities(&self) -> RepoResult<Vec<CompanyActivity>> {
        self.directory.list_activities()
    }

    /// Returns the company referenced by `account.company_id`.
    pub fn get_company_by_user(&self, account: &Account) -> RepoResult<Option<Company>> {
        match account.company_id {
            Some(company_id) => self.directory.find_company(company_id),
            None => Ok(None),
        }
    }

    /// Joins the supplied accounts with their companies in memory.
    ///
    /// The company table is read once regardless of `accounts.len()`.
    pub fn get_users_with_company(
        &self,
        accounts: &[Account],
    ) -> RepoResult<Vec<AccountWithCompany>> {
        let companies: HashMap<CompanyId, Company> = self
            .directory
            .list_companies()?
            .into_iter()
            .map(|company| (company.id, company))
            .collect();

        Ok(accounts
            .iter()
            .map(|account| AccountWithCompany {
                account: account.clone(),
                company: account
                    .company_id
                    .and_then(|id| companies.get(&id).cloned()),
            })
            .collect())
    }

    /// Lists holders of `role_name` with their companies attached.
    pub fn get_users_by_role(&self, role_name: &str) -> RepoResult<Vec<AccountWithCompany>> {
        let holders = self.accounts.get_users_in_role(role_name)?;
        self.get_users_with_company(&holders)
    }

    /// Lists holders of any of `role_names`, de-duplicated by account id.
    pub fn get_users_by_roles<S: AsRef<str>>(
        &self,
        role_names: &[S],
    ) -> RepoResult<Vec<AccountWithCompany>> {
        let mut seen = HashSet::new();
        let mut union = Vec::new();
        for role_name in role_names {
            for account in self.accounts.get_users_in_role(role_name.as_ref())? {
                if seen.insert(account.id.clone()) {
                    union.push(account);
                }
            }
        }
        debug!(
            "event=users_by_roles module=service status=ok roles={} accounts={}",
            role_names.len(),
            union.len()
        );
        self.get_users_with_company(&union)
    }

    pub fn get_roles_by_user(&self, account: &Account) -> RepoResult<Vec<String>> {
        self.accounts.get_roles(account)
    }

    pub fn search_by_activity(&self, description: &str) -> RepoResult<Vec<Account>> {
        self.directory.search_by_activity(description)
    }

    pub fn search_by_last_name(&self, fragment: &str) -> RepoResult<Vec<Account>> {
        self.directory.search_by_last_name(fragment)
    }

    pub fn search_by_company_name(&self, fragment: &str) -> RepoResult<Vec<Account>> {
        self.directory.search_by_company_name(fragment)
    }
}

fn log_outcome(event: &str, account_id: &str, outcome: &Outcome) {
    if outcome.succeeded {
        info!("event={event} module=service status=ok account_id={account_id}");
    } else {
        warn!(
            "event={} module=service status=rejected account_id={} error_codes={}",
            event,
            account_id,
            outcome.error_codes()
        );
    }
}
