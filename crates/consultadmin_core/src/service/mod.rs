//! Administration use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into role and user administration APIs.
//! - Keep callers decoupled from storage details; stores are injected as
//!   trait-typed collaborators.

pub mod role_admin;
pub mod user_admin;
