//! Domain model for the administration layer.
//!
//! # Responsibility
//! - Define the account, role and company records exchanged with stores.
//! - Define the uniform `Outcome` shape returned by every mutation.
//!
//! # Invariants
//! - Account and role identities are opaque strings and never reused.
//! - Role membership is not a field on either entity; it lives in the
//!   store's join relation.

pub mod account;
pub mod company;
pub mod outcome;
pub mod request;
pub mod role;
