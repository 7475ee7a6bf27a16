//! Catalogue of grantable permissions, grouped by category.
//!
//! The wire shape (`PermissionGroup`) is loose strings; loading it into a
//! [`PermissionCatalogue`] validates every value into a [`Permission`].

use serde::{Deserialize, Serialize};

use crate::{Permission, PermissionError};

/// One grantable permission as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPermission {
    pub value: String,
    pub description: String,
}

/// A category of grantable permissions as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGroup {
    pub name: String,
    pub permissions: Vec<GroupPermission>,
}

/// A validated grantable permission with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionCatalogueEntry {
    pub value: Permission,
    pub description: String,
    pub category: String,
}

/// A validated category, entries in server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionCategory {
    pub name: String,
    pub entries: Vec<PermissionCatalogueEntry>,
}

/// Validated catalogue. Categories are kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionCatalogue {
    categories: Vec<PermissionCategory>,
}

impl PermissionCatalogue {
    /// Validate API groups into a catalogue.
    ///
    /// Duplicate values inside one category are collapsed (first wins).
    pub fn from_groups(groups: Vec<PermissionGroup>) -> Result<Self, PermissionError> {
        let mut categories = Vec::with_capacity(groups.len());

        for group in groups {
            let mut entries: Vec<PermissionCatalogueEntry> = Vec::with_capacity(group.permissions.len());
            for item in group.permissions {
                let value = Permission::parse(&item.value)?;
                if entries.iter().any(|e| e.value == value) {
                    tracing::debug!(category = %group.name, permission = %value, "duplicate catalogue entry skipped");
                    continue;
                }
                entries.push(PermissionCatalogueEntry {
                    value,
                    description: item.description,
                    category: group.name.clone(),
                });
            }
            categories.push(PermissionCategory {
                name: group.name,
                entries,
            });
        }

        // Stable: groups sharing a name keep server order.
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self { categories })
    }

    /// Categories in lexicographic order.
    pub fn categories(&self) -> &[PermissionCategory] {
        &self.categories
    }

    pub fn entries(&self) -> impl Iterator<Item = &PermissionCatalogueEntry> + '_ {
        self.categories.iter().flat_map(|c| c.entries.iter())
    }

    pub fn find(&self, value: &str) -> Option<&PermissionCatalogueEntry> {
        self.entries().find(|e| e.value.as_str() == value)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Default catalogue
// ─────────────────────────────────────────────────────────────────────────────

const DEFAULT_GROUPS: &[(&str, &[(&str, &str)])] = &[
    ("Global", &[("*", "All permissions.")]),
    (
        "Users",
        &[
            ("users.*", "All permissions related to users."),
            ("users.access", "Permission to access users management."),
            ("users.create", "Permission to create users."),
            ("users.view", "Permission to view users."),
            ("users.view.self", "Permission to view own user."),
            ("users.view.other", "Permission to view other user."),
            ("users.update", "Permission to update users."),
            ("users.update.self", "Permission to update own user."),
            ("users.delete", "Permission to delete users."),
            ("users.delete.self", "Permission to delete own user."),
            ("users.delete.other", "Permission to delete other user."),
        ],
    ),
    (
        "Organizations",
        &[
            ("organizations.*", "All permissions related to organizations."),
            ("organizations.access", "Permission to access organizations management."),
            ("organizations.create", "Permission to create organizations."),
            ("organizations.view", "Permission to view organizations."),
            ("organizations.update", "Permission to update organizations."),
            ("organizations.delete", "Permission to delete organizations."),
        ],
    ),
    (
        "Roles",
        &[
            ("roles.*", "All permissions related to roles."),
            ("roles.access", "Permission to access roles management."),
            ("roles.create", "Permission to create roles."),
            ("roles.view", "Permission to view roles."),
            ("roles.update", "Permission to update roles."),
            ("roles.delete", "Permission to delete roles."),
        ],
    ),
    (
        "Audit Logs",
        &[
            ("audit_logs.*", "All permissions related to audit logs."),
            ("audit_logs.create", "Permission to create audit logs."),
            ("audit_logs.view", "Permission to view audit logs."),
            ("audit_logs.update", "Permission to update audit logs."),
            ("audit_logs.delete", "Permission to delete audit logs."),
        ],
    ),
    (
        "Materials",
        &[
            ("materials.*", "All permissions related to materials."),
            ("materials.access", "Permission to access materials management."),
            ("materials.create", "Permission to create materials."),
            ("materials.view", "Permission to view materials."),
            ("materials.update", "Permission to update materials."),
            ("materials.delete", "Permission to delete materials."),
        ],
    ),
    (
        "Products",
        &[
            ("products.*", "All permissions related to products."),
            ("products.access", "Permission to access products management."),
            ("products.create", "Permission to create products."),
            ("products.view", "Permission to view products."),
            ("products.update", "Permission to update products."),
            ("products.delete", "Permission to delete products."),
        ],
    ),
    (
        "Transactions",
        &[
            ("transactions.*", "All permissions related to transactions."),
            ("transactions.access", "Permission to access transactions management."),
            ("transactions.create", "Permission to create transactions."),
            ("transactions.view", "Permission to view transactions."),
            ("transactions.update", "Permission to update transactions."),
            ("transactions.delete", "Permission to delete transactions."),
        ],
    ),
    (
        "Notifications",
        &[
            ("notifications.*", "All permissions related to notifications."),
            ("notifications.access", "Permission to access notifications management."),
            ("notifications.create", "Permission to create notifications."),
            ("notifications.view", "Permission to view notifications."),
            ("notifications.update", "Permission to update notifications."),
            ("notifications.delete", "Permission to delete notifications."),
        ],
    ),
];

/// The groups the back-office API serves from `GET /api/permissions`.
pub fn default_groups() -> Vec<PermissionGroup> {
    DEFAULT_GROUPS
        .iter()
        .map(|(name, permissions)| PermissionGroup {
            name: (*name).to_string(),
            permissions: permissions
                .iter()
                .map(|(value, description)| GroupPermission {
                    value: (*value).to_string(),
                    description: (*description).to_string(),
                })
                .collect(),
        })
        .collect()
}

/// Validated default catalogue.
pub fn default_catalogue() -> PermissionCatalogue {
    let categories = DEFAULT_GROUPS
        .iter()
        .map(|(name, permissions)| PermissionCategory {
            name: (*name).to_string(),
            entries: permissions
                .iter()
                .map(|(value, description)| PermissionCatalogueEntry {
                    value: Permission::from_static(*value),
                    description: (*description).to_string(),
                    category: (*name).to_string(),
                })
                .collect(),
        })
        .collect::<Vec<_>>();

    let mut catalogue = PermissionCatalogue { categories };
    catalogue.categories.sort_by(|a, b| a.name.cmp(&b.name));
    catalogue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_sorted_by_name() {
        let catalogue = default_catalogue();
        let names: Vec<&str> = catalogue.categories().iter().map(|c| c.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.first(), Some(&"Audit Logs"));
    }

    #[test]
    fn from_groups_matches_default_catalogue() {
        let loaded = PermissionCatalogue::from_groups(default_groups()).unwrap();
        assert_eq!(loaded, default_catalogue());
    }

    #[test]
    fn from_groups_rejects_malformed_values() {
        let groups = vec![PermissionGroup {
            name: "Broken".to_string(),
            permissions: vec![GroupPermission {
                value: "  ".to_string(),
                description: "blank".to_string(),
            }],
        }];
        assert_eq!(PermissionCatalogue::from_groups(groups), Err(PermissionError::Empty));
    }

    #[test]
    fn from_groups_collapses_duplicate_values() {
        let groups = vec![PermissionGroup {
            name: "Users".to_string(),
            permissions: vec![
                GroupPermission {
                    value: "users.view.other".to_string(),
                    description: "first".to_string(),
                },
                GroupPermission {
                    value: "users.view.other".to_string(),
                    description: "second".to_string(),
                },
            ],
        }];
        let catalogue = PermissionCatalogue::from_groups(groups).unwrap();
        assert_eq!(catalogue.entries().count(), 1);
        assert_eq!(catalogue.find("users.view.other").unwrap().description, "first");
    }

    #[test]
    fn entries_carry_their_category() {
        let catalogue = default_catalogue();
        let entry = catalogue.find("roles.update").unwrap();
        assert_eq!(entry.category, "Roles");
    }

    #[test]
    fn group_wire_shape() {
        let json = serde_json::json!({
            "name": "Roles",
            "permissions": [{ "value": "roles.view", "description": "View roles." }]
        });
        let group: PermissionGroup = serde_json::from_value(json).unwrap();
        assert_eq!(group.permissions[0].value, "roles.view");
    }
}
