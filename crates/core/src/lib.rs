//! `threereco-core`: shared identifiers and the domain error model.
//!
//! This crate contains **pure** primitives used by the authorization and
//! console crates (no IO, no transport).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{OrganizationId, RoleId, UserId};
