use serde::{Deserialize, Serialize};

use threereco_core::RoleId;

use crate::matcher::{evaluate, GrantState, RequestedPermission};
use crate::GrantedPermissionSet;

/// A role and the permissions it grants.
///
/// Roles are edited one permission at a time, but the update call always
/// transmits the full resulting list (see [`Role::permissions_after`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: GrantedPermissionSet,
}

/// Direction of a single-permission edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn from_checked(checked: bool) -> Self {
        if checked { Toggle::On } else { Toggle::Off }
    }
}

impl Role {
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            permissions: GrantedPermissionSet::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: GrantedPermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    /// Grant state of `value` under this role's own permission list.
    pub fn grant_state(&self, value: &str) -> GrantState {
        evaluate(&RequestedPermission::from(value), &self.permissions)
    }

    /// The full permission list to send after toggling `value`.
    ///
    /// - `On`: existing exact occurrences removed, then `value` appended once.
    /// - `Off`: every exact occurrence removed (duplicates included).
    ///
    /// The role itself is not modified.
    pub fn permissions_after(&self, toggle: Toggle, value: &str) -> GrantedPermissionSet {
        match toggle {
            Toggle::On => self.permissions.with(value),
            Toggle::Off => self.permissions.without(value),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
