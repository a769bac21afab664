//! Input shapes accepted by the admin services.

use crate::model::account::AccountId;
use crate::model::company::CompanyId;
use crate::model::role::RoleId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoleRequest {
    pub role_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role_id: RoleId,
    pub role_name: String,
}

/// Registration input for a new account.
///
/// `password` is handed to the account store as the credential and is
/// never logged or echoed back.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("company_id", &self.company_id)
            .finish()
    }
}

/// Mutable account fields. Identity and credentials are not editable here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
}
