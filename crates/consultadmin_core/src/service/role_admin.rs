//! Role administration use-cases.
//!
//! # Responsibility
//! - Create, rename and delete roles through `RoleStore`.
//! - Strip role membership from every holder before deleting a role.
//!
//! # Invariants
//! - Unknown role ids yield exactly one `RoleNotFound` error.
//! - Renaming never changes a role id.
//! - The delete cascade runs sequentially and is not transactional: a
//!   failed removal does not stop later removals, earlier removals are
//!   kept, and the role record survives when any removal failed.

use crate::model::outcome::{Outcome, OutcomeError};
use crate::model::request::{CreateRoleRequest, UpdateRoleRequest};
use crate::model::role::Role;
use crate::repo::account_store::AccountStore;
use crate::repo::role_store::RoleStore;
use crate::repo::RepoResult;
use log::{info, warn};

/// Role lifecycle service over injected stores.
pub struct RoleAdmin<A: AccountStore, R: RoleStore> {
    accounts: A,
    roles: R,
}

impl<A: AccountStore, R: RoleStore> RoleAdmin<A, R> {
    pub fn new(accounts: A, roles: R) -> Self {
        Self { accounts, roles }
    }

    /// Creates a role with a fresh id. Validation is left to the store.
    pub fn create_role(&self, request: &CreateRoleRequest) -> RepoResult<Outcome> {
        let role = Role::new(request.role_name.clone());
        let outcome = self.roles.create(&role)?;
        log_outcome("role_create", &role.id, &outcome);
        Ok(outcome)
    }

    /// Renames an existing role.
    pub fn update_role(&self, request: &UpdateRoleRequest) -> RepoResult<Outcome> {
        let Some(mut role) = self.roles.find_by_id(&request.role_id)? else {
            warn!(
                "event=role_update module=service status=not_found role_id={}",
                request.role_id
            );
            return Ok(Outcome::failed_with(OutcomeError::role_not_found(
                &request.role_id,
            )));
        };

        role.name = request.role_name.clone();
        let outcome = self.roles.update(&role)?;
        log_outcome("role_update", &role.id, &outcome);
        Ok(outcome)
    }

    /// Removes the role from every holder, then deletes the role record.
    pub fn delete_role(&self, id: &str) -> RepoResult<Outcome> {
        let Some(role) = self.roles.find_by_id(id)? else {
            warn!("event=role_delete module=service status=not_found role_id={id}");
            return Ok(Outcome::failed_with(OutcomeError::role_not_found(id)));
        };

        let holders = self.accounts.get_users_in_role(&role.name)?;
        let mut removal_errors = Vec::new();
        for account in &holders {
            let removed = self.accounts.remove_role(account, &role.name)?;
            if !removed.succeeded {
                warn!(
                    "event=role_membership_remove module=service status=error role_id={} account_id={} error_codes={}",
                    role.id,
                    account.id,
                    removed.error_codes()
                );
                removal_errors.extend(removed.errors);
            }
        }

        if !removal_errors.is_empty() {
            warn!(
                "event=role_delete module=service status=error role_id={} holders={} failed_removals={}",
                role.id,
                holders.len(),
                removal_errors.len()
            );
            return Ok(Outcome::failed(removal_errors));
        }

        let outcome = self.roles.delete(&role)?;
        if outcome.succeeded {
            info!(
                "event=role_delete module=service status=ok role_id={} detached_holders={}",
                role.id,
                holders.len()
            );
        } else {
            log_outcome("role_delete", &role.id, &outcome);
        }
        Ok(outcome)
    }

    pub fn get_role_by_id(&self, id: &str) -> RepoResult<Option<Role>> {
        self.roles.find_by_id(id)
    }

    pub fn list_roles(&self) -> RepoResult<Vec<Role>> {
        self.roles.roles()
    }
}

fn log_outcome(event: &str, role_id: &str, outcome: &Outcome) {
    if outcome.succeeded {
        info!("event={event} module=service status=ok role_id={role_id}");
    } else {
        warn!(
            "event={} module=service status=rejected role_id={} error_codes={}",
            event,
            role_id,
            outcome.error_codes()
        );
    }
}
