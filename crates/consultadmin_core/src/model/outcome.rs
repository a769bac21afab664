//! Uniform success/failure outcome for admin mutations.
//!
//! # Responsibility
//! - Carry business-level failures (not-found, store rejections) as values.
//! - Keep a stable `code` per failure kind next to a human description.
//!
//! # Invariants
//! - `succeeded == errors.is_empty()` for every outcome built here.
//! - Storage faults are never encoded as an `Outcome`; they travel as
//!   `RepoError`.

use crate::model::company::CompanyId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const CODE_ROLE_NOT_FOUND: &str = "RoleNotFound";
pub const CODE_USER_NOT_FOUND: &str = "UserNotFound";
pub const CODE_DUPLICATE_ROLE_NAME: &str = "DuplicateRoleName";
pub const CODE_INVALID_ROLE_NAME: &str = "InvalidRoleName";
pub const CODE_DUPLICATE_EMAIL: &str = "DuplicateEmail";
pub const CODE_INVALID_EMAIL: &str = "InvalidEmail";
pub const CODE_PASSWORD_REQUIRED: &str = "PasswordRequired";
pub const CODE_USER_ALREADY_IN_ROLE: &str = "UserAlreadyInRole";
pub const CODE_USER_NOT_IN_ROLE: &str = "UserNotInRole";
pub const CODE_ROLE_IN_USE: &str = "RoleInUse";
pub const CODE_USER_HAS_ROLES: &str = "UserHasRoles";
pub const CODE_COMPANY_NOT_FOUND: &str = "CompanyNotFound";
pub const CODE_CONCURRENCY_FAILURE: &str = "ConcurrencyFailure";

/// One failure entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    /// Stable machine-readable kind, one of the `CODE_*` constants.
    pub code: String,
    pub description: String,
}

impl OutcomeError {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }

    pub fn role_not_found(id: &str) -> Self {
        Self::new(CODE_ROLE_NOT_FOUND, format!("Role with ID {id} not found."))
    }

    pub fn user_not_found(id: &str) -> Self {
        Self::new(CODE_USER_NOT_FOUND, format!("User with ID {id} not found."))
    }

    pub fn role_name_not_found(name: &str) -> Self {
        Self::new(CODE_ROLE_NOT_FOUND, format!("Role {name} does not exist."))
    }

    pub fn duplicate_role_name(name: &str) -> Self {
        Self::new(
            CODE_DUPLICATE_ROLE_NAME,
            format!("Role name '{name}' is already taken."),
        )
    }

    pub fn invalid_role_name(name: &str) -> Self {
        Self::new(
            CODE_INVALID_ROLE_NAME,
            format!("Role name '{name}' is invalid."),
        )
    }

    pub fn duplicate_email(email: &str) -> Self {
        Self::new(
            CODE_DUPLICATE_EMAIL,
            format!("Email '{email}' is already taken."),
        )
    }

    pub fn invalid_email(email: &str) -> Self {
        Self::new(CODE_INVALID_EMAIL, format!("Email '{email}' is invalid."))
    }

    pub fn password_required() -> Self {
        Self::new(CODE_PASSWORD_REQUIRED, "Password must not be empty.")
    }

    pub fn user_already_in_role(role_name: &str) -> Self {
        Self::new(
            CODE_USER_ALREADY_IN_ROLE,
            format!("User already in role '{role_name}'."),
        )
    }

    pub fn user_not_in_role(role_name: &str) -> Self {
        Self::new(
            CODE_USER_NOT_IN_ROLE,
            format!("User is not in role '{role_name}'."),
        )
    }

    pub fn role_in_use(name: &str, holders: usize) -> Self {
        Self::new(
            CODE_ROLE_IN_USE,
            format!("Role '{name}' is still held by {holders} user(s)."),
        )
    }

    pub fn user_has_roles(id: &str, roles: usize) -> Self {
        Self::new(
            CODE_USER_HAS_ROLES,
            format!("User with ID {id} still holds {roles} role(s)."),
        )
    }

    pub fn company_not_found(id: CompanyId) -> Self {
        Self::new(
            CODE_COMPANY_NOT_FOUND,
            format!("Company with ID {id} not found."),
        )
    }

    pub fn concurrency_failure() -> Self {
        Self::new(
            CODE_CONCURRENCY_FAILURE,
            "Optimistic concurrency failure, object has been modified.",
        )
    }
}

impl Display for OutcomeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

/// Success flag plus the collected failure entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub succeeded: bool,
    pub errors: Vec<OutcomeError>,
}

impl Outcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            errors: Vec::new(),
        }
    }

    /// Builds a failure. An empty `errors` list still yields a failure.
    pub fn failed(errors: Vec<OutcomeError>) -> Self {
        Self {
            succeeded: false,
            errors,
        }
    }

    pub fn failed_with(error: OutcomeError) -> Self {
        Self::failed(vec![error])
    }

    /// Returns whether any error carries `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|error| error.code == code)
    }

    /// Joins error codes for log lines, e.g. `RoleInUse,UserNotInRole`.
    pub fn error_codes(&self) -> String {
        self.errors
            .iter()
            .map(|error| error.code.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.succeeded {
            return write!(f, "Succeeded");
        }
        write!(f, "Failed")?;
        for (index, error) in self.errors.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{error}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Outcome, OutcomeError, CODE_ROLE_NOT_FOUND};

    #[test]
    fn role_not_found_uses_exact_description() {
        let error = OutcomeError::role_not_found("42");
        assert_eq!(error.code, CODE_ROLE_NOT_FOUND);
        assert_eq!(error.description, "Role with ID 42 not found.");
    }

    #[test]
    fn display_lists_every_error() {
        let outcome = Outcome::failed(vec![
            OutcomeError::user_not_in_role("Admin"),
            OutcomeError::role_not_found("7"),
        ]);
        let rendered = outcome.to_string();
        assert!(rendered.starts_with("Failed: UserNotInRole"));
        assert!(rendered.contains("; RoleNotFound: Role with ID 7 not found."));
        assert_eq!(outcome.error_codes(), "UserNotInRole,RoleNotFound");
        assert_eq!(Outcome::success().to_string(), "Succeeded");
    }
}
