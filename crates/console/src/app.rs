//! Console wiring: one session, one gate, one notifier per process.

use std::sync::Arc;
use std::time::Duration;

use threereco_core::RoleId;

use crate::api::ConsoleApi;
use crate::config::ConsoleConfig;
use crate::editor::{EditorError, RolePermissionEditor};
use crate::gate::AuthenticationGate;
use crate::guard::{AccessGuard, GuardOutcome};
use crate::notify::Notifier;
use crate::session::{RefreshTrigger, SessionContext};

pub struct Console {
    config: ConsoleConfig,
    session: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
}

impl Console {
    pub fn new(config: ConsoleConfig, api: Arc<dyn ConsoleApi>, notifier: Arc<dyn Notifier>) -> Self {
        let session = Arc::new(SessionContext::new(api, config.refresh));
        Self {
            config,
            session,
            notifier,
        }
    }

    /// Install tracing from `config.log` and build the HTTP-backed console.
    #[cfg(feature = "http")]
    pub fn from_config(
        config: ConsoleConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, crate::api::ApiError> {
        threereco_observability::init_with(&config.log);
        let api = crate::http::HttpConsoleApi::from_config(&config)?;
        tracing::info!(api_url = %api.api_url(), "console configured");
        Ok(Self::new(config, Arc::new(api), notifier))
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn notification_duration(&self) -> Duration {
        self.config.notification_duration()
    }

    /// The initial mount: issues the session lookups if the policy allows.
    pub async fn mount(&self) -> bool {
        self.session.on_trigger(RefreshTrigger::Mount).await
    }

    pub fn gate(&self) -> AuthenticationGate {
        AuthenticationGate::new(
            Arc::clone(&self.session),
            Arc::clone(&self.notifier),
            self.notification_duration(),
        )
    }

    pub fn guard(&self, guard: &AccessGuard) -> GuardOutcome {
        guard.decide(&self.session.snapshot())
    }

    pub async fn open_role_editor(&self, role_id: RoleId) -> Result<RolePermissionEditor, EditorError> {
        RolePermissionEditor::open(
            Arc::clone(&self.session),
            Arc::clone(&self.notifier),
            self.notification_duration(),
            role_id,
        )
        .await
    }
}
