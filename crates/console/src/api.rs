//! The remote back-office API, as seen by the console.

use async_trait::async_trait;
use thiserror::Error;

use threereco_auth::{GrantedPermissionSet, PermissionGroup, Role};
use threereco_core::RoleId;

use crate::types::{ErrorResponse, LoginPayload, MfaCode, Organization, User};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: ErrorResponse },

    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// The `{ error, message }` pair shown to the user.
    ///
    /// Server errors pass through verbatim; local failures get a generic title.
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            ApiError::Api { body, .. } => body.clone(),
            ApiError::Network(message) => ErrorResponse::new("Network error", message.clone()),
            ApiError::Parse(message) => ErrorResponse::new("Unexpected response", message.clone()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Endpoints the authorization subsystem consumes.
///
/// Implementations must not retry; retry/revalidation policy belongs to the
/// session and editor.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// `GET /api/authentication/check` (`None` when no user is attached).
    async fn check_session(&self) -> Result<Option<User>, ApiError>;

    /// `GET /api/authentication/organizations`
    async fn organizations(&self) -> Result<Vec<Organization>, ApiError>;

    /// `GET /api/authentication/permissions`
    async fn permissions(&self) -> Result<GrantedPermissionSet, ApiError>;

    /// `GET /api/permissions`
    async fn permission_catalogue(&self) -> Result<Vec<PermissionGroup>, ApiError>;

    /// `GET /api/roles/{id}`
    async fn role(&self, id: RoleId) -> Result<Role, ApiError>;

    /// `PATCH /api/roles/{id}` with the full resulting permission list.
    async fn update_role_permissions(
        &self,
        id: RoleId,
        permissions: &GrantedPermissionSet,
    ) -> Result<(), ApiError>;

    /// `POST /api/authentication/login`
    async fn login(&self, payload: &LoginPayload) -> Result<(), ApiError>;

    /// `POST /api/authentication/mfa/verify`
    async fn verify_mfa(&self, code: &MfaCode) -> Result<(), ApiError>;

    /// `POST /api/authentication/logout`
    async fn logout(&self) -> Result<(), ApiError>;

    /// Address of the MFA provisioning image (rendered, never fetched here).
    fn mfa_provisioning_url(&self) -> String;
}
