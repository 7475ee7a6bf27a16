//! Application-shell authentication gate.
//!
//! The gate never moves on its own: every transition is the result of a
//! successful mutation followed by re-fetching the session. Failed mutations
//! raise an error notification and leave the session (and so the state)
//! untouched.

use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiError;
use crate::notify::{Notification, Notifier};
use crate::session::{SessionContext, SessionSnapshot};
use crate::types::{LoginPayload, MfaCode};

/// What the application shell shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Gate disabled (public route): render the application.
    Bypassed,
    /// The session check has not answered yet.
    CheckingAuthentication,
    /// Render the login form.
    Unauthenticated,
    /// Signed in without MFA: render enrollment (provisioning image + code).
    MfaEnrollment { email: String, provisioning_url: String },
    /// MFA enabled but not verified for this session: render code entry.
    MfaVerification { email: String },
    /// Render the application.
    Authenticated,
}

impl GateState {
    pub fn renders_application(&self) -> bool {
        matches!(self, GateState::Bypassed | GateState::Authenticated)
    }
}

pub struct AuthenticationGate {
    session: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
    notification_duration: Duration,
    disabled: bool,
}

impl AuthenticationGate {
    pub fn new(session: Arc<SessionContext>, notifier: Arc<dyn Notifier>, notification_duration: Duration) -> Self {
        Self {
            session,
            notifier,
            notification_duration,
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn state(&self) -> GateState {
        if self.disabled {
            return GateState::Bypassed;
        }
        self.state_for(&self.session.snapshot())
    }

    /// Gate state for a given snapshot (ignores `disabled`).
    pub fn state_for(&self, session: &SessionSnapshot) -> GateState {
        if session.is_loading {
            return GateState::CheckingAuthentication;
        }

        let user = match (&session.user, session.is_error) {
            (Some(user), false) => user,
            _ => return GateState::Unauthenticated,
        };

        if !user.mfa_enabled {
            return GateState::MfaEnrollment {
                email: user.email.clone(),
                provisioning_url: self.session.api().mfa_provisioning_url(),
            };
        }

        if !user.mfa_verified {
            return GateState::MfaVerification {
                email: user.email.clone(),
            };
        }

        GateState::Authenticated
    }

    /// Submit credentials. On success the whole session is re-fetched.
    pub async fn login(&self, payload: &LoginPayload) -> Result<(), ApiError> {
        if let Err(err) = self.session.api().login(payload).await {
            tracing::warn!(error = %err, "login failed");
            self.notifier
                .notify(Notification::from_api_error(&err, self.notification_duration));
            return Err(err);
        }

        self.session.refetch().await;
        tracing::info!(state = ?self.state(), "login succeeded");

        self.notifier.notify(Notification::success(
            "Login successful",
            "You have been logged in successfully.",
            self.notification_duration,
        ));
        Ok(())
    }

    /// Submit an MFA code (enrollment or verification). On success the
    /// session check is invalidated and re-fetched.
    pub async fn verify_mfa(&self, code: &MfaCode) -> Result<(), ApiError> {
        let enrolling = matches!(self.state(), GateState::MfaEnrollment { .. });

        if let Err(err) = self.session.api().verify_mfa(code).await {
            tracing::warn!(error = %err, enrolling, "MFA verification failed");
            self.notifier
                .notify(Notification::from_api_error(&err, self.notification_duration));
            return Err(err);
        }

        let description = if enrolling {
            "You have successfully enabled MFA."
        } else {
            "You have successfully verified your MFA."
        };
        self.notifier
            .notify(Notification::success("Success", description, self.notification_duration));

        self.session.refresh_user().await;
        tracing::info!(state = ?self.state(), "MFA verified");
        Ok(())
    }
}
