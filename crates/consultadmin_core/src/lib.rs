//! User and role administration over pluggable identity stores.
//! Ships SQLite-backed stores and the `RoleAdmin`/`UserAdmin` services.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, AccountId, AccountWithCompany};
pub use model::company::{ActivityId, Company, CompanyActivity, CompanyActivityLink, CompanyId};
pub use model::outcome::{Outcome, OutcomeError};
pub use model::request::{CreateRoleRequest, CreateUserRequest, UpdateRoleRequest, UpdateUserRequest};
pub use model::role::{Role, RoleId};
pub use repo::account_store::{AccountStore, SqliteAccountStore};
pub use repo::credential::CredentialHasher;
pub use repo::directory_repo::{DirectoryQuery, SqliteDirectory};
pub use repo::role_store::{RoleStore, SqliteRoleStore};
pub use repo::{RepoError, RepoResult};
pub use service::role_admin::RoleAdmin;
pub use service::user_admin::UserAdmin;

/// Minimal health-check API for host wiring checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
