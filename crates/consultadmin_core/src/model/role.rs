//! Role domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque role identity. New roles receive a UUID v4 string.
pub type RoleId = String;

/// Named permission group. Names are unique across stored roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

impl Role {
    /// Creates a role with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name)
    }

    /// Creates a role with a caller-provided id.
    pub fn with_id(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
