//! Business directory records: companies and their activities.
//!
//! These records are owned by the directory tables and are read-only for
//! the admin services.

use crate::model::account::AccountId;
use serde::{Deserialize, Serialize};

pub type CompanyId = i64;
pub type ActivityId = i64;

/// Company an account may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    /// Back-reference to the account that registered the company.
    pub owner_account_id: Option<AccountId>,
}

/// Business activity tag, e.g. "Consulting".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyActivity {
    pub id: ActivityId,
    pub description: String,
}

/// Many-to-many link between a company and an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyActivityLink {
    pub company_id: CompanyId,
    pub activity_id: ActivityId,
}
