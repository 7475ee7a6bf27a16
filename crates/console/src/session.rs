//! Session context: current user, organizations and granted permissions.
//!
//! The context is constructed explicitly and shared by `Arc`; guards read a
//! synchronous [`SessionSnapshot`]. Three independent lookups back it, each
//! in its own [`Lookup`] slot, so a failure in one never blocks the others.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use threereco_auth::{GrantState, GrantedPermissionSet, RequestedPermission, evaluate};

use crate::api::{ApiError, ConsoleApi};
use crate::cache::{Lookup, Pending};
use crate::config::RefreshPolicy;
use crate::types::{Organization, User};

/// What prompted a revalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Mount,
    WindowFocus,
    Reconnect,
    /// Explicit invalidation (e.g. after a mutation). Always honored.
    Invalidate,
}

/// Point-in-time view of the session, as consumed by guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub organizations: Vec<Organization>,
    pub permissions: GrantedPermissionSet,
    /// Some lookup has not answered yet.
    pub is_loading: bool,
    /// Some lookup's latest answer was a failure.
    pub is_error: bool,
}

impl SessionSnapshot {
    /// Initial state: nobody signed in, nothing granted, nothing pending.
    pub fn unauthenticated() -> Self {
        Self {
            user: None,
            organizations: Vec::new(),
            permissions: GrantedPermissionSet::new(),
            is_loading: false,
            is_error: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Grant state of `requested` under the session's permissions.
    pub fn evaluate(&self, requested: &RequestedPermission) -> GrantState {
        evaluate(requested, &self.permissions)
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    user: Lookup<Option<User>>,
    organizations: Lookup<Vec<Organization>>,
    permissions: Lookup<GrantedPermissionSet>,
}

fn user_slot(state: &mut SessionState) -> &mut Lookup<Option<User>> {
    &mut state.user
}

fn organizations_slot(state: &mut SessionState) -> &mut Lookup<Vec<Organization>> {
    &mut state.organizations
}

fn permissions_slot(state: &mut SessionState) -> &mut Lookup<GrantedPermissionSet> {
    &mut state.permissions
}

pub struct SessionContext {
    api: Arc<dyn ConsoleApi>,
    policy: RefreshPolicy,
    state: RwLock<SessionState>,
}

impl core::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionContext")
            .field("policy", &self.policy)
            .field("state", &*self.read())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Create an unauthenticated context. Nothing is fetched until
    /// [`SessionContext::load`] or a refresh trigger.
    pub fn new(api: Arc<dyn ConsoleApi>, policy: RefreshPolicy) -> Self {
        Self {
            api,
            policy,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn api(&self) -> &Arc<dyn ConsoleApi> {
        &self.api
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.read();
        SessionSnapshot {
            user: state.user.data().cloned().flatten(),
            organizations: state.organizations.data().cloned().unwrap_or_default(),
            permissions: state.permissions.data().cloned().unwrap_or_default(),
            is_loading: state.user.is_loading()
                || state.organizations.is_loading()
                || state.permissions.is_loading(),
            is_error: state.user.is_error()
                || state.organizations.is_error()
                || state.permissions.is_error(),
        }
    }

    /// Issue the three lookups concurrently. Each result is applied as soon
    /// as it arrives.
    pub async fn load(&self) {
        tokio::join!(
            self.refresh_user(),
            self.refresh_organizations(),
            self.refresh_permissions()
        );

        let snapshot = self.snapshot();
        tracing::info!(
            authenticated = snapshot.is_authenticated(),
            permissions = snapshot.permissions.len(),
            is_error = snapshot.is_error,
            "session loaded"
        );
    }

    /// Re-run the three lookups one after another.
    pub async fn refetch(&self) {
        self.refresh_user().await;
        self.refresh_organizations().await;
        self.refresh_permissions().await;
    }

    /// Revalidate if `trigger` is enabled by the refresh policy.
    ///
    /// Returns whether lookups were issued.
    pub async fn on_trigger(&self, trigger: RefreshTrigger) -> bool {
        let enabled = match trigger {
            RefreshTrigger::Mount => self.policy.on_mount,
            RefreshTrigger::WindowFocus => self.policy.on_window_focus,
            RefreshTrigger::Reconnect => self.policy.on_reconnect,
            RefreshTrigger::Invalidate => true,
        };

        if !enabled {
            tracing::debug!(?trigger, "refresh trigger disabled");
            return false;
        }

        tracing::debug!(?trigger, "revalidating session");
        self.load().await;
        true
    }

    // A refresh dropped mid-flight abandons its ticket (see `Pending`), so a
    // cancelled lookup never leaves the session loading.

    pub async fn refresh_user(&self) {
        let pending = Pending::begin(&self.state, user_slot);
        let result = self.api.check_session().await;
        log_failure("user", &result);
        pending.settle(result);
    }

    pub async fn refresh_organizations(&self) {
        let pending = Pending::begin(&self.state, organizations_slot);
        let result = self.api.organizations().await;
        log_failure("organizations", &result);
        pending.settle(result);
    }

    pub async fn refresh_permissions(&self) {
        let pending = Pending::begin(&self.state, permissions_slot);
        let result = self.api.permissions().await;
        log_failure("permissions", &result);
        pending.settle(result);
    }

    /// Drop everything back to the unauthenticated state. Responses still in
    /// flight are discarded when they arrive.
    pub fn teardown(&self) {
        let mut state = self.write();
        state.user.clear();
        state.organizations.clear();
        state.permissions.clear();
        tracing::info!("session torn down");
    }

    /// Log out on the server, then tear the session down.
    ///
    /// The local session is cleared even if the server call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.api.logout().await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "logout request failed");
        }
        self.teardown();
        result
    }
}

fn log_failure<T>(lookup: &'static str, result: &Result<T, ApiError>) {
    if let Err(err) = result {
        tracing::warn!(lookup, error = %err, "session lookup failed");
    }
}
