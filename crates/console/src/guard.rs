//! Page and element guards.
//!
//! A guard combines its bypass flag, the session's loading/error state and
//! the matcher's verdict into a [`GuardOutcome`]. Only an exact
//! [`GrantState::Granted`] unlocks children; `Indeterminate` is treated as
//! not granted in both modes.

use threereco_auth::{GrantState, RequestedPermission, explain};

use crate::session::SessionSnapshot;

/// Where the guard sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardMode {
    /// Guards a whole page: denial renders a full-page view.
    Page,
    /// Guards a fragment: denial renders the fallback.
    Element,
}

/// Full-page denial views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeniedPage {
    SignInRequired,
    NotAuthorized,
}

impl DeniedPage {
    pub const HOME_LINK: &'static str = "/";

    pub fn title(self) -> &'static str {
        "Oops!"
    }

    pub fn message(self) -> &'static str {
        match self {
            DeniedPage::SignInRequired => "You need to be logged in to access this page.",
            DeniedPage::NotAuthorized => "You have found a page that you do not have access to.",
        }
    }

    pub fn home_link(self) -> &'static str {
        Self::HOME_LINK
    }

    pub fn home_label(self) -> &'static str {
        "Go To Home Page"
    }
}

/// What a guard renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Children,
    Fallback,
    Denied(DeniedPage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGuard {
    requested: RequestedPermission,
    mode: GuardMode,
    disabled: bool,
}

impl AccessGuard {
    pub fn new(requested: impl Into<RequestedPermission>, mode: GuardMode) -> Self {
        Self {
            requested: requested.into(),
            mode,
            disabled: false,
        }
    }

    pub fn page(requested: impl Into<RequestedPermission>) -> Self {
        Self::new(requested, GuardMode::Page)
    }

    pub fn element(requested: impl Into<RequestedPermission>) -> Self {
        Self::new(requested, GuardMode::Element)
    }

    /// Bypass the guard entirely (public routes).
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn requested(&self) -> &RequestedPermission {
        &self.requested
    }

    pub fn mode(&self) -> GuardMode {
        self.mode
    }

    /// Decide what to render. First matching row wins:
    ///
    /// | condition                          | page                | element  |
    /// |------------------------------------|---------------------|----------|
    /// | disabled                           | children            | children |
    /// | session loading or errored         | fallback            | fallback |
    /// | no user                            | sign-in required    | fallback |
    /// | user, verdict is not `Granted`     | not authorized      | fallback |
    /// | otherwise                          | children            | children |
    pub fn decide(&self, session: &SessionSnapshot) -> GuardOutcome {
        if self.disabled {
            return GuardOutcome::Children;
        }

        if session.is_loading || session.is_error {
            return GuardOutcome::Fallback;
        }

        if session.user.is_none() {
            return match self.mode {
                GuardMode::Page => GuardOutcome::Denied(DeniedPage::SignInRequired),
                GuardMode::Element => GuardOutcome::Fallback,
            };
        }

        let state = session.evaluate(&self.requested);
        if tracing::enabled!(tracing::Level::DEBUG) {
            let explanation = explain(&self.requested, &session.permissions);
            tracing::debug!(
                mode = ?self.mode,
                ?state,
                rule = ?explanation.rule,
                reason = %explanation.reason,
                "permission guard evaluated"
            );
        }

        match (state, self.mode) {
            (GrantState::Granted, _) => GuardOutcome::Children,
            (GrantState::Indeterminate | GrantState::Denied, GuardMode::Page) => {
                GuardOutcome::Denied(DeniedPage::NotAuthorized)
            }
            (GrantState::Indeterminate | GrantState::Denied, GuardMode::Element) => {
                GuardOutcome::Fallback
            }
        }
    }

    /// Render through caller-supplied builders.
    pub fn render<T>(
        &self,
        session: &SessionSnapshot,
        children: impl FnOnce() -> T,
        fallback: impl FnOnce() -> T,
        denied: impl FnOnce(DeniedPage) -> T,
    ) -> T {
        match self.decide(session) {
            GuardOutcome::Children => children(),
            GuardOutcome::Fallback => fallback(),
            GuardOutcome::Denied(page) => denied(page),
        }
    }

    /// Element rendering with the default fallback (nothing).
    pub fn render_or_nothing<T>(&self, session: &SessionSnapshot, children: impl FnOnce() -> T) -> Option<T> {
        match self.decide(session) {
            GuardOutcome::Children => Some(children()),
            GuardOutcome::Fallback | GuardOutcome::Denied(_) => None,
        }
    }
}
