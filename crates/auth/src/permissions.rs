use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Permission identifier.
///
/// Permissions are dot-segmented strings (e.g. `"users.view"`). A trailing
/// `*` segment marks a wildcard (`"roles.*"`), and a lone `"*"` covers
/// everything. The set of grantable permissions is server-defined, so this
/// type never enumerates them; it only validates shape at the boundary where
/// a catalogue is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("permission is empty")]
    Empty,

    #[error("permission '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("permission '{0}' contains whitespace")]
    Whitespace(String),
}

impl Permission {
    /// Wrap a permission string without validation.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Validate and wrap a permission string.
    ///
    /// Surrounding whitespace is trimmed; the remainder must be non-empty,
    /// whitespace-free and made of non-empty dot segments.
    pub fn parse(raw: &str) -> Result<Self, PermissionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PermissionError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(PermissionError::Whitespace(trimmed.to_string()));
        }
        if trimmed.split('.').any(str::is_empty) {
            return Err(PermissionError::EmptySegment(trimmed.to_string()));
        }
        Ok(Self(Cow::Owned(trimmed.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The global wildcard `"*"`.
    pub fn is_global(&self) -> bool {
        self.as_str() == "*"
    }

    /// Whether this permission contains a wildcard character anywhere.
    pub fn is_wildcard(&self) -> bool {
        self.as_str().contains('*')
    }

    /// The prefix this permission covers once wildcard markers are removed.
    pub fn cleaned(&self) -> String {
        cleaned(self.as_str())
    }
}

/// Strip every literal `".*"`, then every remaining `"*"`.
///
/// `"users.*"` becomes `"users"`, `"*"` becomes `""`.
pub fn cleaned(permission: &str) -> String {
    permission.replace(".*", "").replace('*', "")
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl core::str::FromStr for Permission {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Permission constants used by page and element guards.
pub mod known {
    use super::Permission;

    pub const ALL: Permission = Permission::from_static("*");

    pub const USERS_VIEW: Permission = Permission::from_static("users.view");
    pub const USERS_CREATE: Permission = Permission::from_static("users.create");
    pub const USERS_UPDATE: Permission = Permission::from_static("users.update");
    pub const USERS_DELETE: Permission = Permission::from_static("users.delete");

    pub const ROLES_VIEW: Permission = Permission::from_static("roles.view");
    pub const ROLES_CREATE: Permission = Permission::from_static("roles.create");
    pub const ROLES_UPDATE: Permission = Permission::from_static("roles.update");

    pub const PERMISSIONS_VIEW: Permission = Permission::from_static("permissions.view");

    pub const AUDIT_LOGS_VIEW: Permission = Permission::from_static("audit_logs.view");

    pub const MATERIALS_VIEW: Permission = Permission::from_static("materials.view");
    pub const MATERIALS_CREATE: Permission = Permission::from_static("materials.create");
    pub const MATERIALS_UPDATE: Permission = Permission::from_static("materials.update");
    pub const MATERIALS_DELETE: Permission = Permission::from_static("materials.delete");

    pub const PRODUCTS_VIEW: Permission = Permission::from_static("products.view");
    pub const PRODUCTS_CREATE: Permission = Permission::from_static("products.create");
    pub const PRODUCTS_UPDATE: Permission = Permission::from_static("products.update");
    pub const PRODUCTS_DELETE: Permission = Permission::from_static("products.delete");

    pub const TRANSACTIONS_VIEW: Permission = Permission::from_static("transactions.view");
    pub const TRANSACTIONS_CREATE: Permission = Permission::from_static("transactions.create");
    pub const TRANSACTIONS_UPDATE: Permission = Permission::from_static("transactions.update");
    pub const TRANSACTIONS_DELETE: Permission = Permission::from_static("transactions.delete");
}
