//! `threereco-console`
//!
//! **Responsibility:** client-side authorization for the back-office console.
//!
//! This crate provides:
//! - The session context (current user, organizations, granted permissions)
//! - Page and element access guards
//! - The login / MFA authentication gate
//! - The role permission editor
//!
//! The API stays the authority: everything here decides what to *show*, never
//! what is allowed.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod editor;
pub mod gate;
pub mod guard;
#[cfg(feature = "http")]
pub mod http;
pub mod notify;
pub mod session;
pub mod types;

pub use api::{ApiError, ConsoleApi};
pub use app::Console;
pub use cache::{Lookup, Ticket};
pub use config::{ConfigError, ConsoleConfig, RefreshPolicy};
pub use editor::{CategoryRows, CheckboxState, EditorError, PermissionRow, RolePermissionEditor};
pub use gate::{AuthenticationGate, GateState};
pub use guard::{AccessGuard, DeniedPage, GuardMode, GuardOutcome};
#[cfg(feature = "http")]
pub use http::HttpConsoleApi;
pub use notify::{Notification, NotificationLevel, Notifier, QueuedNotifier, TracingNotifier};
pub use session::{RefreshTrigger, SessionContext, SessionSnapshot};
pub use types::{ErrorResponse, LoginPayload, MfaCode, Organization, User};
