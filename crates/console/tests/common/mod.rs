#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use threereco_auth::{GrantedPermissionSet, PermissionGroup, Role, default_groups};
use threereco_console::api::{ApiError, ConsoleApi};
use threereco_console::types::{ErrorResponse, LoginPayload, MfaCode, Organization, User};
use threereco_core::{OrganizationId, RoleId, UserId};

pub const PASSWORD: &str = "correct horse";
pub const MFA_CODE: &str = "123456";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Check,
    Organizations,
    Permissions,
    Catalogue,
    Role,
    UpdateRole,
    Login,
    VerifyMfa,
    Logout,
}

#[derive(Debug, Default)]
struct Server {
    user: Option<User>,
    /// User that a successful login attaches to the session.
    account: Option<User>,
    organizations: Vec<Organization>,
    permissions: GrantedPermissionSet,
    roles: HashMap<RoleId, Role>,
    catalogue: Vec<PermissionGroup>,
    failing: HashSet<Endpoint>,
    updates: Vec<(RoleId, GrantedPermissionSet)>,
}

/// In-memory back office.
#[derive(Debug, Default)]
pub struct FakeApi {
    server: Mutex<Server>,
    calls: Mutex<HashMap<Endpoint, usize>>,
    check_paused: AtomicUsize,
    check_entered: Notify,
    check_release: Notify,
}

pub fn user(mfa_enabled: bool, mfa_verified: bool) -> User {
    User {
        id: UserId::new(),
        email: "operator@example.com".to_string(),
        name: Some("Operator".to_string()),
        mfa_enabled,
        mfa_verified,
    }
}

pub fn organization(name: &str) -> Organization {
    Organization {
        id: OrganizationId::new(),
        name: name.to_string(),
    }
}

pub fn unauthorized() -> ApiError {
    ApiError::Api {
        status: 401,
        body: ErrorResponse::new("Unauthorized", "Invalid credentials."),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.server().catalogue = default_groups();
        api
    }

    /// A fully signed-in session with the given permissions.
    pub fn signed_in(permissions: &[&str]) -> Self {
        let api = Self::new();
        {
            let mut server = api.server();
            server.user = Some(user(true, true));
            server.organizations = vec![organization("Recycling Co")];
            server.permissions = permissions.iter().copied().collect();
        }
        api
    }

    fn server(&self) -> std::sync::MutexGuard<'_, Server> {
        self.server.lock().unwrap()
    }

    fn record(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        *self.calls.lock().unwrap().entry(endpoint).or_default() += 1;
        if self.server().failing.contains(&endpoint) {
            return Err(match endpoint {
                Endpoint::Login | Endpoint::VerifyMfa => unauthorized(),
                _ => ApiError::Api {
                    status: 500,
                    body: ErrorResponse::new("Internal Server Error", "Something went wrong."),
                },
            });
        }
        Ok(())
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().unwrap().get(&endpoint).copied().unwrap_or(0)
    }

    pub fn fail(&self, endpoint: Endpoint) {
        self.server().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.server().failing.remove(&endpoint);
    }

    pub fn set_user(&self, user: Option<User>) {
        self.server().user = user;
    }

    pub fn set_account(&self, account: User) {
        self.server().account = Some(account);
    }

    pub fn set_permissions(&self, permissions: &[&str]) {
        self.server().permissions = permissions.iter().copied().collect();
    }

    pub fn insert_role(&self, role: Role) {
        self.server().roles.insert(role.id, role);
    }

    pub fn stored_role(&self, id: RoleId) -> Option<Role> {
        self.server().roles.get(&id).cloned()
    }

    /// Permission lists sent to `update_role_permissions`, in order.
    pub fn updates(&self) -> Vec<(RoleId, GrantedPermissionSet)> {
        self.server().updates.clone()
    }

    /// Hold the next session check until [`FakeApi::release_check`].
    pub fn pause_check(&self) {
        self.check_paused.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn wait_check_entered(&self) {
        self.check_entered.notified().await;
    }

    pub fn release_check(&self) {
        self.check_release.notify_one();
    }
}

#[async_trait]
impl ConsoleApi for FakeApi {
    async fn check_session(&self) -> Result<Option<User>, ApiError> {
        let paused = self
            .check_paused
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if paused {
            self.check_entered.notify_one();
            self.check_release.notified().await;
        }

        self.record(Endpoint::Check)?;
        Ok(self.server().user.clone())
    }

    async fn organizations(&self) -> Result<Vec<Organization>, ApiError> {
        self.record(Endpoint::Organizations)?;
        Ok(self.server().organizations.clone())
    }

    async fn permissions(&self) -> Result<GrantedPermissionSet, ApiError> {
        self.record(Endpoint::Permissions)?;
        Ok(self.server().permissions.clone())
    }

    async fn permission_catalogue(&self) -> Result<Vec<PermissionGroup>, ApiError> {
        self.record(Endpoint::Catalogue)?;
        Ok(self.server().catalogue.clone())
    }

    async fn role(&self, id: RoleId) -> Result<Role, ApiError> {
        self.record(Endpoint::Role)?;
        self.server().roles.get(&id).cloned().ok_or_else(|| ApiError::Api {
            status: 404,
            body: ErrorResponse::new("Not Found", "Role not found."),
        })
    }

    async fn update_role_permissions(
        &self,
        id: RoleId,
        permissions: &GrantedPermissionSet,
    ) -> Result<(), ApiError> {
        self.record(Endpoint::UpdateRole)?;
        let mut server = self.server();
        server.updates.push((id, permissions.clone()));
        match server.roles.get_mut(&id) {
            Some(role) => {
                role.permissions = permissions.clone();
                Ok(())
            }
            None => Err(ApiError::Api {
                status: 404,
                body: ErrorResponse::new("Not Found", "Role not found."),
            }),
        }
    }

    async fn login(&self, payload: &LoginPayload) -> Result<(), ApiError> {
        self.record(Endpoint::Login)?;
        let mut server = self.server();
        if payload.password != PASSWORD {
            return Err(unauthorized());
        }
        server.user = Some(server.account.clone().unwrap_or_else(|| user(false, false)));
        Ok(())
    }

    async fn verify_mfa(&self, code: &MfaCode) -> Result<(), ApiError> {
        self.record(Endpoint::VerifyMfa)?;
        let mut server = self.server();
        if code.as_str() != MFA_CODE {
            return Err(ApiError::Api {
                status: 400,
                body: ErrorResponse::new("Bad Request", "Invalid MFA code."),
            });
        }
        if let Some(user) = server.user.as_mut() {
            user.mfa_enabled = true;
            user.mfa_verified = true;
        }
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record(Endpoint::Logout)?;
        self.server().user = None;
        Ok(())
    }

    fn mfa_provisioning_url(&self) -> String {
        "http://localhost:6173/api/authentication/mfa/enable".to_string()
    }
}
