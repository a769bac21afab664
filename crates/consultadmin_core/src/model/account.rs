//! Account domain model.
//!
//! # Responsibility
//! - Define the user identity record managed through `AccountStore`.
//! - Provide the account+company read model used by listing queries.
//!
//! # Invariants
//! - `id` is stable for the account lifetime.
//! - `company_id`, when set, refers to a row in the company directory.

use crate::model::company::{Company, CompanyId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque account identity. New accounts receive a UUID v4 string.
pub type AccountId = String;

/// User identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Login name; accounts created by `UserAdmin` use their email.
    pub user_name: String,
    pub email: String,
    /// Display name.
    pub first_name: String,
    pub last_name: String,
    /// Owning company, if any.
    pub company_id: Option<CompanyId>,
}

impl Account {
    /// Creates an account with a generated id and no company.
    pub fn new(user_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), user_name, email)
    }

    /// Creates an account with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: impl Into<AccountId>,
        user_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_name: user_name.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            company_id: None,
        }
    }

    /// Sets both name fields, returning the updated account.
    pub fn named(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Sets the owning company, returning the updated account.
    pub fn in_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }
}

/// Account with its owning company eagerly joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountWithCompany {
    pub account: Account,
    /// `None` when the account has no company.
    pub company: Option<Company>,
}

impl AccountWithCompany {
    /// Returns the joined company name, if any.
    pub fn company_name(&self) -> Option<&str> {
        self.company.as_ref().map(|company| company.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Account;

    #[test]
    fn new_account_gets_unique_id_and_no_company() {
        let first = Account::new("a@example.com", "a@example.com");
        let second = Account::new("b@example.com", "b@example.com");
        assert_ne!(first.id, second.id);
        assert_eq!(first.company_id, None);
        assert!(first.last_name.is_empty());
    }

    #[test]
    fn builders_set_names_and_company() {
        let account = Account::with_id("1", "user1", "user1@example.com")
            .named("Ada", "Smith")
            .in_company(7);
        assert_eq!(account.id, "1");
        assert_eq!(account.first_name, "Ada");
        assert_eq!(account.last_name, "Smith");
        assert_eq!(account.company_id, Some(7));
    }
}
