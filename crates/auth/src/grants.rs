//! Granted permission sets.

use serde::{Deserialize, Serialize};

use crate::Permission;

/// The permission strings granted to an actor (or held by a role).
///
/// Order carries no meaning for matching and duplicates are tolerated; the
/// raw list is kept as received so that role mutations transmit exactly what
/// the server sent back, minus the edited value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantedPermissionSet(Vec<String>);

impl GrantedPermissionSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Effective permissions of a user: the union of its roles' lists with
    /// empty entries dropped and duplicates removed (first occurrence kept).
    pub fn union_of<'a, I>(role_permissions: I) -> Self
    where
        I: IntoIterator<Item = &'a GrantedPermissionSet>,
    {
        let mut merged: Vec<String> = Vec::new();
        for set in role_permissions {
            for entry in set.normalized() {
                if !merged.iter().any(|m| m == entry) {
                    merged.push(entry.to_string());
                }
            }
        }
        Self(merged)
    }

    /// Entries as received, including blanks and duplicates.
    pub fn raw(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// Trimmed, non-empty entries. This is the view every matching rule sees.
    pub fn normalized(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|p| p.trim()).filter(|p| !p.is_empty())
    }

    /// True when no usable entry remains after normalization.
    pub fn is_effectively_empty(&self) -> bool {
        self.normalized().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of raw entries exactly equal to `value`.
    pub fn occurrences(&self, value: &str) -> usize {
        self.0.iter().filter(|p| p.as_str() == value).count()
    }

    /// A copy of this set without any exact occurrence of `value`.
    pub fn without(&self, value: &str) -> Self {
        Self(self.0.iter().filter(|p| p.as_str() != value).cloned().collect())
    }

    /// A copy of this set holding `value` exactly once, appended last.
    pub fn with(&self, value: &str) -> Self {
        let mut next = self.without(value);
        next.0.push(value.to_string());
        next
    }
}

impl From<Vec<String>> for GrantedPermissionSet {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<Vec<Permission>> for GrantedPermissionSet {
    fn from(value: Vec<Permission>) -> Self {
        Self(value.into_iter().map(|p| p.as_str().to_string()).collect())
    }
}

impl<'a> FromIterator<&'a str> for GrantedPermissionSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl FromIterator<String> for GrantedPermissionSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
