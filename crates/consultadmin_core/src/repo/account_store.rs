//! Account store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist accounts together with their hashed credential.
//! - Own the account/role membership join relation (`account_roles`).
//!
//! # Invariants
//! - Email addresses are unique across accounts, ignoring ASCII case.
//! - `company_id` must reference an existing company; a dangling reference
//!   is rejected with `CompanyNotFound`.
//! - An account holding roles cannot be deleted; memberships must be
//!   removed first.
//! - Membership rows always reference an existing account and role.

use crate::model::account::{Account, AccountId};
use crate::model::company::CompanyId;
use crate::model::outcome::{Outcome, OutcomeError};
use crate::repo::credential::CredentialHasher;
use crate::repo::{is_foreign_key_violation, is_unique_violation, RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension, Row};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub(crate) const ACCOUNT_COLUMNS: &str = "a.id AS id,
    a.user_name AS user_name,
    a.email AS email,
    a.first_name AS first_name,
    a.last_name AS last_name,
    a.company_id AS company_id";

/// Account persistence and role membership contract.
pub trait AccountStore {
    /// Inserts `account` with `credential` hashed.
    fn create(&self, account: &Account, credential: &str) -> RepoResult<Outcome>;
    fn find_by_id(&self, id: &str) -> RepoResult<Option<Account>>;
    /// Persists every mutable field of `account`.
    fn update(&self, account: &Account) -> RepoResult<Outcome>;
    fn delete(&self, account: &Account) -> RepoResult<Outcome>;
    /// Returns the names of roles held by `account`, sorted by name.
    fn get_roles(&self, account: &Account) -> RepoResult<Vec<String>>;
    fn assign_role(&self, account: &Account, role_name: &str) -> RepoResult<Outcome>;
    fn remove_role(&self, account: &Account, role_name: &str) -> RepoResult<Outcome>;
    /// Returns every account holding `role_name`. Unknown roles yield an
    /// empty list.
    fn get_users_in_role(&self, role_name: &str) -> RepoResult<Vec<Account>>;
}

/// SQLite-backed account store.
pub struct SqliteAccountStore<'conn> {
    conn: &'conn Connection,
    hasher: CredentialHasher,
}

impl<'conn> SqliteAccountStore<'conn> {
    /// Creates a store using default Argon2id costs.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_hasher(conn, CredentialHasher::default())
    }

    pub fn with_hasher(conn: &'conn Connection, hasher: CredentialHasher) -> Self {
        Self { conn, hasher }
    }

    /// Returns the stored credential hash for `id`, if the account exists.
    pub fn password_hash(&self, id: &str) -> RepoResult<Option<String>> {
        let hash = self
            .conn
            .query_row(
                "SELECT password_hash FROM accounts WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    /// Checks `credential` against the stored hash of account `id`.
    ///
    /// Returns `false` for unknown accounts.
    pub fn check_credential(&self, id: &str, credential: &str) -> RepoResult<bool> {
        match self.password_hash(id)? {
            Some(hash) => self.hasher.verify(credential, &hash),
            None => Ok(false),
        }
    }

    fn email_taken_by_other(&self, email: &str, id: &str) -> RepoResult<bool> {
        let taken: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?1 AND id <> ?2);",
            params![email, id],
            |row| row.get(0),
        )?;
        Ok(taken == 1)
    }

    fn role_id_by_name(&self, role_name: &str) -> RepoResult<Option<String>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM roles WHERE name = ?1;",
                [role_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn company_exists(&self, id: CompanyId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn account_exists(&self, id: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn validate(&self, account: &Account) -> RepoResult<Vec<OutcomeError>> {
        let mut errors = Vec::new();
        if !EMAIL_RE.is_match(account.email.trim()) {
            errors.push(OutcomeError::invalid_email(&account.email));
        } else if self.email_taken_by_other(&account.email, &account.id)? {
            errors.push(OutcomeError::duplicate_email(&account.email));
        }
        if let Some(company_id) = account.company_id {
            if !self.company_exists(company_id)? {
                errors.push(OutcomeError::company_not_found(company_id));
            }
        }
        Ok(errors)
    }
}

impl AccountStore for SqliteAccountStore<'_> {
    fn create(&self, account: &Account, credential: &str) -> RepoResult<Outcome> {
        let mut errors = self.validate(account)?;
        if credential.is_empty() {
            errors.push(OutcomeError::password_required());
        }
        if !errors.is_empty() {
            return Ok(Outcome::failed(errors));
        }

        let password_hash = self.hasher.hash(credential)?;
        let inserted = self.conn.execute(
            "INSERT INTO accounts (
                id,
                user_name,
                email,
                first_name,
                last_name,
                company_id,
                password_hash
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                account.id.as_str(),
                account.user_name.as_str(),
                account.email.as_str(),
                account.first_name.as_str(),
                account.last_name.as_str(),
                account.company_id,
                password_hash,
            ],
        );

        match inserted {
            Ok(_) => Ok(Outcome::success()),
            Err(err) if is_unique_violation(&err) => Ok(Outcome::failed_with(
                OutcomeError::duplicate_email(&account.email),
            )),
            Err(err) if is_foreign_key_violation(&err) => Ok(dangling_company(account)),
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Option<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.id = ?1;"
        ))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_account_row(row)?));
        }
        Ok(None)
    }

    fn update(&self, account: &Account) -> RepoResult<Outcome> {
        let errors = self.validate(account)?;
        if !errors.is_empty() {
            return Ok(Outcome::failed(errors));
        }

        let updated = self.conn.execute(
            "UPDATE accounts
             SET
                user_name = ?1,
                email = ?2,
                first_name = ?3,
                last_name = ?4,
                company_id = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6;",
            params![
                account.user_name.as_str(),
                account.email.as_str(),
                account.first_name.as_str(),
                account.last_name.as_str(),
                account.company_id,
                account.id.as_str(),
            ],
        );
        let changed = match updated {
            Ok(changed) => changed,
            Err(err) if is_unique_violation(&err) => {
                return Ok(Outcome::failed_with(OutcomeError::duplicate_email(
                    &account.email,
                )));
            }
            Err(err) if is_foreign_key_violation(&err) => return Ok(dangling_company(account)),
            Err(err) => return Err(err.into()),
        };

        if changed == 0 {
            return Ok(Outcome::failed_with(OutcomeError::concurrency_failure()));
        }
        Ok(Outcome::success())
    }

    fn delete(&self, account: &Account) -> RepoResult<Outcome> {
        let held: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM account_roles WHERE account_id = ?1;",
            [account.id.as_str()],
            |row| row.get(0),
        )?;
        if held > 0 {
            return Ok(Outcome::failed_with(OutcomeError::user_has_roles(
                &account.id,
                usize::try_from(held).unwrap_or(usize::MAX),
            )));
        }

        let changed = self
            .conn
            .execute("DELETE FROM accounts WHERE id = ?1;", [account.id.as_str()])?;
        if changed == 0 {
            return Ok(Outcome::failed_with(OutcomeError::concurrency_failure()));
        }
        Ok(Outcome::success())
    }

    fn get_roles(&self, account: &Account) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.name
             FROM account_roles ar
             INNER JOIN roles r ON r.id = ar.role_id
             WHERE ar.account_id = ?1
             ORDER BY r.name ASC;",
        )?;
        let names = stmt
            .query_map([account.id.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn assign_role(&self, account: &Account, role_name: &str) -> RepoResult<Outcome> {
        let Some(role_id) = self.role_id_by_name(role_name)? else {
            return Ok(Outcome::failed_with(OutcomeError::role_name_not_found(
                role_name,
            )));
        };
        if !self.account_exists(&account.id)? {
            return Ok(Outcome::failed_with(OutcomeError::user_not_found(
                &account.id,
            )));
        }

        let inserted = self.conn.execute(
            "INSERT INTO account_roles (account_id, role_id) VALUES (?1, ?2);",
            params![account.id.as_str(), role_id],
        );
        match inserted {
            Ok(_) => Ok(Outcome::success()),
            Err(err) if is_unique_violation(&err) => Ok(Outcome::failed_with(
                OutcomeError::user_already_in_role(role_name),
            )),
            Err(err) => Err(err.into()),
        }
    }

    fn remove_role(&self, account: &Account, role_name: &str) -> RepoResult<Outcome> {
        let Some(role_id) = self.role_id_by_name(role_name)? else {
            return Ok(Outcome::failed_with(OutcomeError::role_name_not_found(
                role_name,
            )));
        };

        let changed = self.conn.execute(
            "DELETE FROM account_roles WHERE account_id = ?1 AND role_id = ?2;",
            params![account.id.as_str(), role_id],
        )?;
        if changed == 0 {
            return Ok(Outcome::failed_with(OutcomeError::user_not_in_role(
                role_name,
            )));
        }
        Ok(Outcome::success())
    }

    fn get_users_in_role(&self, role_name: &str) -> RepoResult<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS}
             FROM accounts a
             INNER JOIN account_roles ar ON ar.account_id = a.id
             INNER JOIN roles r ON r.id = ar.role_id
             WHERE r.name = ?1
             ORDER BY a.user_name ASC, a.id ASC;"
        ))?;
        let rows = stmt.query([role_name])?;
        collect_accounts(rows)
    }
}

/// Rejection for a company reference that vanished between validation and
/// the write.
fn dangling_company(account: &Account) -> Outcome {
    match account.company_id {
        Some(company_id) => Outcome::failed_with(OutcomeError::company_not_found(company_id)),
        None => Outcome::failed_with(OutcomeError::concurrency_failure()),
    }
}

pub(crate) fn collect_accounts(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Account>> {
    let mut accounts = Vec::new();
    while let Some(row) = rows.next()? {
        accounts.push(parse_account_row(row)?);
    }
    Ok(accounts)
}

pub(crate) fn parse_account_row(row: &Row<'_>) -> RepoResult<Account> {
    let id: AccountId = row.get("id")?;
    if id.is_empty() {
        return Err(RepoError::InvalidData(
            "empty id in accounts.id".to_string(),
        ));
    }
    Ok(Account {
        id,
        user_name: row.get("user_name")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        company_id: row.get("company_id")?,
    })
}
