//! Store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the account, role and directory contracts the admin services
//!   are written against.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Business rejections (duplicate name, missing membership, dangling
//!   company reference) are returned as `Outcome` values, never as
//!   `RepoError`.
//! - `RepoError` is reserved for storage faults and corrupt rows.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account_store;
pub mod credential;
pub mod directory_repo;
pub mod role_store;

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-level fault raised by a store implementation.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A persisted row could not be mapped back to a domain record.
    InvalidData(String),
    /// The credential hasher rejected its input or parameters.
    Credential(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Credential(message) => write!(f, "credential error: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Credential(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Returns whether `err` is a UNIQUE or PRIMARY KEY constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => matches!(
            failure.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        ),
        _ => false,
    }
}

/// Returns whether `err` is a FOREIGN KEY constraint violation.
pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        }
        _ => false,
    }
}
