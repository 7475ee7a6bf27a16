//! Wire types consumed from the back-office API.
//!
//! These mirror the JSON shapes of the REST endpoints (camelCase keys) and
//! carry no behavior beyond validation of user-entered values.

use serde::{Deserialize, Serialize};

use threereco_auth::GrantedPermissionSet;
use threereco_core::{DomainError, DomainResult, OrganizationId, UserId};

/// The authenticated user as returned by the session check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mfa_enabled: bool,
    #[serde(default)]
    pub mfa_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
}

/// `{ item?: T }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResponse<T> {
    #[serde(default = "Option::default")]
    pub item: Option<T>,
}

/// `{ items: T[] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Error body returned by every endpoint. Shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl core::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Body of `POST /api/authentication/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub email_or_phone: String,
    pub password: String,
}

impl LoginPayload {
    /// Both fields must be non-blank. The server decides everything else.
    pub fn new(email_or_phone: impl Into<String>, password: impl Into<String>) -> DomainResult<Self> {
        let email_or_phone = email_or_phone.into().trim().to_string();
        let password = password.into();

        if email_or_phone.is_empty() {
            return Err(DomainError::validation("email or phone is required"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("password is required"));
        }

        Ok(Self {
            email_or_phone,
            password,
        })
    }
}

/// A one-time MFA code: exactly six ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MfaCode(String);

impl MfaCode {
    pub const LEN: usize = 6;

    pub fn parse(raw: &str) -> DomainResult<Self> {
        let code = raw.trim();
        if code.len() != Self::LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "MFA code must be exactly {} digits",
                Self::LEN
            )));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::str::FromStr for MfaCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Body of `POST /api/authentication/mfa/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyMfaPayload<'a> {
    pub code: &'a MfaCode,
}

/// Body of `PATCH /api/roles/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRolePermissions<'a> {
    pub permissions: &'a GrantedPermissionSet,
}
