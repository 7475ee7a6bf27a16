//! `threereco-auth`: client-side permission model (advisory, fail-closed).
//!
//! This crate is intentionally decoupled from HTTP and rendering. The server
//! remains the authority; everything here only decides what to show.

pub mod catalogue;
pub mod explain;
pub mod grants;
pub mod matcher;
pub mod permissions;
pub mod roles;

pub use catalogue::{
    GroupPermission, PermissionCatalogue, PermissionCatalogueEntry, PermissionCategory,
    PermissionGroup, default_catalogue, default_groups,
};
pub use explain::{MatchExplanation, explain};
pub use grants::GrantedPermissionSet;
pub use matcher::{GrantState, MatchRule, RequestedPermission, evaluate, evaluate_opt};
pub use permissions::{Permission, PermissionError, known};
pub use roles::{Role, Toggle};
