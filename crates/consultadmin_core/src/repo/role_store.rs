//! Role store contract and SQLite implementation.
//!
//! # Invariants
//! - Role names are non-blank and unique, ignoring ASCII case.
//! - A role still held by any account cannot be deleted.

use crate::model::outcome::{Outcome, OutcomeError};
use crate::model::role::Role;
use crate::repo::{is_unique_violation, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Role persistence contract.
pub trait RoleStore {
    fn create(&self, role: &Role) -> RepoResult<Outcome>;
    fn find_by_id(&self, id: &str) -> RepoResult<Option<Role>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Role>>;
    /// Persists `role.name` for the row identified by `role.id`.
    fn update(&self, role: &Role) -> RepoResult<Outcome>;
    fn delete(&self, role: &Role) -> RepoResult<Outcome>;
    /// Enumerates every stored role ordered by name.
    fn roles(&self) -> RepoResult<Vec<Role>>;
}

/// SQLite-backed role store.
pub struct SqliteRoleStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoleStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn validate(&self, role: &Role) -> RepoResult<Option<OutcomeError>> {
        if role.name.trim().is_empty() {
            return Ok(Some(OutcomeError::invalid_role_name(&role.name)));
        }
        match self.find_by_name(&role.name)? {
            Some(existing) if existing.id != role.id => {
                Ok(Some(OutcomeError::duplicate_role_name(&role.name)))
            }
            _ => Ok(None),
        }
    }

    fn query_one(&self, filter: &str, value: &str) -> RepoResult<Option<Role>> {
        let role = self
            .conn
            .query_row(
                &format!("SELECT id, name FROM roles WHERE {filter} = ?1;"),
                [value],
                |row| Ok(parse_role_row(row)),
            )
            .optional()?;
        role.transpose()
    }
}

impl RoleStore for SqliteRoleStore<'_> {
    fn create(&self, role: &Role) -> RepoResult<Outcome> {
        if let Some(error) = self.validate(role)? {
            return Ok(Outcome::failed_with(error));
        }

        let inserted = self.conn.execute(
            "INSERT INTO roles (id, name) VALUES (?1, ?2);",
            params![role.id.as_str(), role.name.as_str()],
        );
        match inserted {
            Ok(_) => Ok(Outcome::success()),
            Err(err) if is_unique_violation(&err) => Ok(Outcome::failed_with(
                OutcomeError::duplicate_role_name(&role.name),
            )),
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Option<Role>> {
        self.query_one("id", id)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Role>> {
        self.query_one("name", name)
    }

    fn update(&self, role: &Role) -> RepoResult<Outcome> {
        if let Some(error) = self.validate(role)? {
            return Ok(Outcome::failed_with(error));
        }

        let changed = match self.conn.execute(
            "UPDATE roles SET name = ?1 WHERE id = ?2;",
            params![role.name.as_str(), role.id.as_str()],
        ) {
            Ok(changed) => changed,
            Err(err) if is_unique_violation(&err) => {
                return Ok(Outcome::failed_with(OutcomeError::duplicate_role_name(
                    &role.name,
                )));
            }
            Err(err) => return Err(err.into()),
        };

        if changed == 0 {
            return Ok(Outcome::failed_with(OutcomeError::concurrency_failure()));
        }
        Ok(Outcome::success())
    }

    fn delete(&self, role: &Role) -> RepoResult<Outcome> {
        let holders: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM account_roles WHERE role_id = ?1;",
            [role.id.as_str()],
            |row| row.get(0),
        )?;
        if holders > 0 {
            return Ok(Outcome::failed_with(OutcomeError::role_in_use(
                &role.name,
                usize::try_from(holders).unwrap_or(usize::MAX),
            )));
        }

        let changed = self
            .conn
            .execute("DELETE FROM roles WHERE id = ?1;", [role.id.as_str()])?;
        if changed == 0 {
            return Ok(Outcome::failed_with(OutcomeError::concurrency_failure()));
        }
        Ok(Outcome::success())
    }

    fn roles(&self) -> RepoResult<Vec<Role>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM roles ORDER BY name ASC, id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut roles = Vec::new();
        while let Some(row) = rows.next()? {
            roles.push(parse_role_row(row)?);
        }
        Ok(roles)
    }
}

fn parse_role_row(row: &Row<'_>) -> RepoResult<Role> {
    let id: String = row.get("id")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank role name for id `{id}` in roles.name"
        )));
    }
    Ok(Role { id, name })
}
