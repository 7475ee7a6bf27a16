//! Role permission editor.
//!
//! Renders the catalogue grouped by category (sorted by name) with each
//! permission's grant state under the edited role, and turns each checkbox
//! change into its own `PATCH` of the role's full permission list. The local
//! role copy only changes when the role is re-fetched after a successful
//! mutation; there is no optimistic update. A successful mutation also
//! invalidates the acting user's session, whose own grants may come from the
//! edited role.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use thiserror::Error;

use threereco_auth::{
    GrantState, Permission, PermissionCatalogue, PermissionError, Role, Toggle, known,
};
use threereco_core::RoleId;

use crate::api::{ApiError, ConsoleApi};
use crate::cache::{Lookup, Pending};
use crate::guard::AccessGuard;
use crate::notify::{Notification, Notifier};
use crate::session::{RefreshTrigger, SessionContext};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid permission catalogue: {0}")]
    Catalogue(#[from] PermissionError),

    #[error("role {0} has not been loaded")]
    RoleUnavailable(RoleId),
}

/// Tri-state checkbox shown per permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckboxState {
    Checked,
    Indeterminate,
    Unchecked,
}

impl From<GrantState> for CheckboxState {
    fn from(value: GrantState) -> Self {
        match value {
            GrantState::Granted => CheckboxState::Checked,
            GrantState::Indeterminate => CheckboxState::Indeterminate,
            GrantState::Denied => CheckboxState::Unchecked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRow {
    pub value: Permission,
    pub description: String,
    pub state: GrantState,
}

impl PermissionRow {
    pub fn checkbox(&self) -> CheckboxState {
        self.state.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRows {
    pub name: String,
    pub rows: Vec<PermissionRow>,
}

fn role_slot(slot: &mut Lookup<Role>) -> &mut Lookup<Role> {
    slot
}

pub struct RolePermissionEditor {
    session: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
    notification_duration: Duration,
    role_id: RoleId,
    catalogue: PermissionCatalogue,
    role: RwLock<Lookup<Role>>,
}

impl RolePermissionEditor {
    /// Guard for the editor page: role updates only, full-page denial.
    pub fn page_guard() -> AccessGuard {
        AccessGuard::page(known::ROLES_UPDATE)
    }

    /// Load the role and the catalogue concurrently.
    pub async fn open(
        session: Arc<SessionContext>,
        notifier: Arc<dyn Notifier>,
        notification_duration: Duration,
        role_id: RoleId,
    ) -> Result<Self, EditorError> {
        let api = Arc::clone(session.api());
        let (role, groups) = tokio::try_join!(api.role(role_id), api.permission_catalogue())?;
        let catalogue = PermissionCatalogue::from_groups(groups)?;

        let mut slot = Lookup::new();
        let ticket = slot.begin();
        slot.settle(ticket, Ok(role));

        tracing::debug!(%role_id, categories = catalogue.categories().len(), "role permission editor opened");

        Ok(Self {
            session,
            notifier,
            notification_duration,
            role_id,
            catalogue,
            role: RwLock::new(slot),
        })
    }

    fn api(&self) -> &Arc<dyn ConsoleApi> {
        self.session.api()
    }

    fn read(&self) -> RwLockReadGuard<'_, Lookup<Role>> {
        self.role.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    pub fn catalogue(&self) -> &PermissionCatalogue {
        &self.catalogue
    }

    /// The role as last fetched.
    pub fn role(&self) -> Option<Role> {
        self.read().data().cloned()
    }

    /// Rows per category, categories in lexicographic order.
    pub fn rows(&self) -> Vec<CategoryRows> {
        let Some(role) = self.role() else {
            return Vec::new();
        };

        self.catalogue
            .categories()
            .iter()
            .map(|category| CategoryRows {
                name: category.name.clone(),
                rows: category
                    .entries
                    .iter()
                    .map(|entry| PermissionRow {
                        value: entry.value.clone(),
                        description: entry.description.clone(),
                        state: role.grant_state(entry.value.as_str()),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Checkbox change handler.
    pub async fn set_checked(&self, value: &str, checked: bool) -> Result<(), EditorError> {
        self.toggle(value, Toggle::from_checked(checked)).await
    }

    /// Send one single-permission change.
    ///
    /// The new list is computed from the role as currently cached; concurrent
    /// toggles are independent requests and the server's final state wins
    /// once the role is re-fetched.
    pub async fn toggle(&self, value: &str, toggle: Toggle) -> Result<(), EditorError> {
        let role = self.role().ok_or(EditorError::RoleUnavailable(self.role_id))?;
        let next = role.permissions_after(toggle, value);

        tracing::info!(role_id = %self.role_id, permission = value, ?toggle, "updating role permissions");

        if let Err(err) = self.api().update_role_permissions(self.role_id, &next).await {
            tracing::warn!(role_id = %self.role_id, permission = value, error = %err, "role update failed");
            self.notifier
                .notify(Notification::from_api_error(&err, self.notification_duration));
            return Err(err.into());
        }

        self.notifier.notify(Notification::success(
            "Success",
            "The role has been updated successfully.",
            self.notification_duration,
        ));

        tokio::join!(
            self.refresh(),
            self.session.on_trigger(RefreshTrigger::Invalidate)
        );
        Ok(())
    }

    /// Re-fetch the role. A response for a superseded refresh is dropped; a
    /// failed refresh keeps the previous role data. Dropping the future
    /// mid-flight abandons the request.
    pub async fn refresh(&self) {
        let pending = Pending::begin(&self.role, role_slot);
        let result = self.api().role(self.role_id).await;
        if let Err(err) = &result {
            tracing::warn!(role_id = %self.role_id, error = %err, "role refresh failed");
        }
        if !pending.settle(result) {
            tracing::debug!(role_id = %self.role_id, "stale role refresh dropped");
        }
    }
}
