//! `reqwest` implementation of [`ConsoleApi`].
//!
//! Authentication is cookie based: the client keeps a cookie store and sends
//! credentials with every request. Responses are wrapped in `{ item }` or
//! `{ items }` envelopes; failures carry `{ error, message }`.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use threereco_auth::{GrantedPermissionSet, PermissionGroup, Role};
use threereco_core::RoleId;

use crate::api::{ApiError, ConsoleApi};
use crate::config::ConsoleConfig;
use crate::types::{
    ErrorResponse, ItemResponse, ItemsResponse, LoginPayload, MfaCode, Organization,
    UpdateRolePermissions, User, VerifyMfaPayload,
};

#[derive(Debug, Clone)]
pub struct HttpConsoleApi {
    api_url: String,
    client: Client,
}

impl HttpConsoleApi {
    pub fn new(api_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ApiError> {
        Self::new(config.api_url.clone())
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.api_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        Err(error_from_body(status, &text))
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        self.send(req)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn item<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let body: ItemResponse<T> = self.json(self.request(Method::GET, path)).await?;
        Ok(body.item)
    }

    async fn items<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let body: ItemsResponse<T> = self.json(self.request(Method::GET, path)).await?;
        Ok(body.items)
    }
}

fn endpoint(api_url: &str, path: &str) -> String {
    format!("{api_url}/api{path}")
}

/// Map a non-success response to an [`ApiError`].
///
/// Bodies that are not `{ error, message }` fall back to the status reason as
/// title and the raw text (or the reason again) as message.
fn error_from_body(status: StatusCode, text: &str) -> ApiError {
    let body = serde_json::from_str::<ErrorResponse>(text).unwrap_or_else(|_| {
        let reason = status.canonical_reason().unwrap_or("Error");
        let message = if text.trim().is_empty() { reason } else { text.trim() };
        ErrorResponse::new(reason, message)
    });

    ApiError::Api {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl ConsoleApi for HttpConsoleApi {
    async fn check_session(&self) -> Result<Option<User>, ApiError> {
        self.item("/authentication/check").await
    }

    async fn organizations(&self) -> Result<Vec<Organization>, ApiError> {
        self.items("/authentication/organizations").await
    }

    async fn permissions(&self) -> Result<GrantedPermissionSet, ApiError> {
        let items: Vec<String> = self.items("/authentication/permissions").await?;
        Ok(items.into())
    }

    async fn permission_catalogue(&self) -> Result<Vec<PermissionGroup>, ApiError> {
        self.items("/permissions").await
    }

    async fn role(&self, id: RoleId) -> Result<Role, ApiError> {
        self.item(&format!("/roles/{id}"))
            .await?
            .ok_or_else(|| ApiError::Parse(format!("role {id} missing from response")))
    }

    async fn update_role_permissions(
        &self,
        id: RoleId,
        permissions: &GrantedPermissionSet,
    ) -> Result<(), ApiError> {
        let req = self
            .request(Method::PATCH, &format!("/roles/{id}"))
            .json(&UpdateRolePermissions { permissions });
        self.send(req).await?;
        Ok(())
    }

    async fn login(&self, payload: &LoginPayload) -> Result<(), ApiError> {
        let req = self
            .request(Method::POST, "/authentication/login")
            .json(payload);
        self.send(req).await?;
        Ok(())
    }

    async fn verify_mfa(&self, code: &MfaCode) -> Result<(), ApiError> {
        let req = self
            .request(Method::POST, "/authentication/mfa/verify")
            .json(&VerifyMfaPayload { code });
        self.send(req).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, "/authentication/logout"))
            .await?;
        Ok(())
    }

    fn mfa_provisioning_url(&self) -> String {
        self.url("/authentication/mfa/enable")
    }
}
