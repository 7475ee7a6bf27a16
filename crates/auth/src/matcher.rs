//! Permission matching (client-side, advisory).
//!
//! The matcher answers "does this granted set cover the requested
//! permission?" with three outcomes. It is pure: no IO, no panics, no
//! normalization beyond trimming granted entries.
//!
//! Precedence is an ordered rule list, evaluated per requested permission:
//!
//! 1. [`MatchRule::Exact`]: a granted entry equals the request verbatim
//!    (including wildcard strings such as `"users.*"`) -> `Granted`.
//! 2. [`MatchRule::WildcardBroadening`]: a granted entry containing `*`
//!    whose cleaned prefix covers the request -> `Indeterminate`.
//! 3. [`MatchRule::LegacyPrefix`]: any granted entry whose cleaned prefix
//!    covers the request -> `Granted`.
//!
//! Rule 3 also inspects wildcard entries, but rule 2 has already claimed
//! every one of those, so that branch never decides anything. It is kept so
//! the rule stays a faithful prefix test when exercised on its own; the
//! ordering is what callers rely on.

use serde::{Deserialize, Serialize};

use crate::permissions::cleaned;
use crate::{GrantedPermissionSet, Permission};

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantState {
    /// Covered by an exact or literal-prefix grant.
    Granted,
    /// Covered only by a broader wildcard. Never authoritative: guards treat
    /// it as not granted, UI may show a partial affordance.
    Indeterminate,
    /// Not covered.
    Denied,
}

impl GrantState {
    pub fn is_granted(self) -> bool {
        self == GrantState::Granted
    }

    pub fn is_denied(self) -> bool {
        self == GrantState::Denied
    }
}

/// One permission, or an OR-list of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestedPermission {
    Single(String),
    AnyOf(Vec<String>),
}

impl RequestedPermission {
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        let slice: &[String] = match self {
            RequestedPermission::Single(p) => core::slice::from_ref(p),
            RequestedPermission::AnyOf(list) => list,
        };
        slice.iter().map(String::as_str)
    }
}

impl Default for RequestedPermission {
    fn default() -> Self {
        RequestedPermission::AnyOf(Vec::new())
    }
}

impl From<&str> for RequestedPermission {
    fn from(value: &str) -> Self {
        RequestedPermission::Single(value.to_string())
    }
}

impl From<String> for RequestedPermission {
    fn from(value: String) -> Self {
        RequestedPermission::Single(value)
    }
}

impl From<&Permission> for RequestedPermission {
    fn from(value: &Permission) -> Self {
        RequestedPermission::Single(value.as_str().to_string())
    }
}

impl From<Permission> for RequestedPermission {
    fn from(value: Permission) -> Self {
        RequestedPermission::from(&value)
    }
}

impl From<Vec<String>> for RequestedPermission {
    fn from(value: Vec<String>) -> Self {
        RequestedPermission::AnyOf(value)
    }
}

impl From<&[&str]> for RequestedPermission {
    fn from(value: &[&str]) -> Self {
        RequestedPermission::AnyOf(value.iter().map(|p| p.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RequestedPermission {
    fn from(value: [&str; N]) -> Self {
        RequestedPermission::from(&value[..])
    }
}

impl From<&[Permission]> for RequestedPermission {
    fn from(value: &[Permission]) -> Self {
        RequestedPermission::AnyOf(value.iter().map(|p| p.as_str().to_string()).collect())
    }
}

/// A single matching rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Exact,
    WildcardBroadening,
    LegacyPrefix,
}

impl MatchRule {
    /// Evaluation order. Do not reorder.
    pub const ORDER: [MatchRule; 3] = [
        MatchRule::Exact,
        MatchRule::WildcardBroadening,
        MatchRule::LegacyPrefix,
    ];

    /// State produced when this rule fires.
    pub fn outcome(self) -> GrantState {
        match self {
            MatchRule::Exact | MatchRule::LegacyPrefix => GrantState::Granted,
            MatchRule::WildcardBroadening => GrantState::Indeterminate,
        }
    }

    /// Whether a single (already trimmed) granted entry satisfies this rule.
    pub fn matches(self, requested: &str, granted: &str) -> bool {
        match self {
            MatchRule::Exact => granted == requested,
            MatchRule::WildcardBroadening => granted.contains('*') && covers(granted, requested),
            MatchRule::LegacyPrefix => covers(granted, requested),
        }
    }

    /// First normalized granted entry satisfying this rule, if any.
    pub fn apply<'g>(self, requested: &str, granted: &'g GrantedPermissionSet) -> Option<&'g str> {
        granted.normalized().find(|g| self.matches(requested, g))
    }
}

fn covers(granted: &str, requested: &str) -> bool {
    let prefix = cleaned(granted);
    prefix == requested || requested.starts_with(prefix.as_str())
}

/// The decisive match: which requested permission, which rule, which grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Decisive<'r, 'g> {
    pub requested: &'r str,
    pub rule: MatchRule,
    pub grant: &'g str,
}

pub(crate) fn decide<'r, 'g>(
    requested: &'r RequestedPermission,
    granted: &'g GrantedPermissionSet,
) -> Option<Decisive<'r, 'g>> {
    if granted.is_effectively_empty() {
        return None;
    }

    for p in requested.iter() {
        for rule in MatchRule::ORDER {
            if let Some(grant) = rule.apply(p, granted) {
                return Some(Decisive {
                    requested: p,
                    rule,
                    grant,
                });
            }
        }
    }

    None
}

/// Evaluate a requested permission (or OR-list) against a granted set.
///
/// An empty or absent granted set always yields [`GrantState::Denied`], as
/// does an empty request list.
pub fn evaluate(requested: &RequestedPermission, granted: &GrantedPermissionSet) -> GrantState {
    decide(requested, granted)
        .map(|d| d.rule.outcome())
        .unwrap_or(GrantState::Denied)
}

/// [`evaluate`] over an optional granted set (absent = nothing granted).
pub fn evaluate_opt(
    requested: &RequestedPermission,
    granted: Option<&GrantedPermissionSet>,
) -> GrantState {
    granted.map_or(GrantState::Denied, |g| evaluate(requested, g))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(entries: &[&str]) -> GrantedPermissionSet {
        entries.iter().copied().collect()
    }

    fn eval(requested: impl Into<RequestedPermission>, granted: &[&str]) -> GrantState {
        evaluate(&requested.into(), &set(granted))
    }

    #[test]
    fn wildcard_grant_is_indeterminate() {
        assert_eq!(eval("users.view", &["users.*"]), GrantState::Indeterminate);
    }

    #[test]
    fn exact_grant_is_granted() {
        assert_eq!(eval("users.view", &["users.view"]), GrantState::Granted);
    }

    #[test]
    fn empty_grants_are_denied() {
        assert_eq!(eval("users.view", &[]), GrantState::Denied);
        assert_eq!(eval("", &[]), GrantState::Denied);
        assert_eq!(eval("*", &["", "   "]), GrantState::Denied);
    }

    #[test]
    fn literal_prefix_is_granted() {
        assert_eq!(eval("users.view", &["users"]), GrantState::Granted);
    }

    #[test]
    fn global_wildcard_is_indeterminate_for_everything() {
        assert_eq!(eval(["audit_logs.view"], &["*"]), GrantState::Indeterminate);
        assert_eq!(eval("", &["*"]), GrantState::Indeterminate);
    }

    #[test]
    fn exact_wildcard_string_beats_broadening() {
        assert_eq!(eval("users.*", &["users.*"]), GrantState::Granted);
        assert_eq!(eval("*", &["*"]), GrantState::Granted);
    }

    #[test]
    fn exact_wins_even_when_a_wildcard_also_covers() {
        assert_eq!(eval("users.view", &["*", "users.view"]), GrantState::Granted);
    }

    #[test]
    fn wildcard_beats_literal_prefix() {
        assert_eq!(eval("users.view", &["users", "users.*"]), GrantState::Indeterminate);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(eval("Users.view", &["users.view"]), GrantState::Denied);
        assert_eq!(eval("users.view", &["USERS.*"]), GrantState::Denied);
    }

    #[test]
    fn granted_entries_are_trimmed() {
        assert_eq!(eval("users.view", &["  users.view  "]), GrantState::Granted);
    }

    #[test]
    fn requested_entries_are_not_trimmed() {
        assert_eq!(eval(" users.view", &["users.view"]), GrantState::Denied);
    }

    #[test]
    fn empty_request_string_only_matches_empty_prefixes() {
        assert_eq!(eval("", &["users.view"]), GrantState::Denied);
        assert_eq!(eval("", &["users.*"]), GrantState::Denied);
    }

    #[test]
    fn prefix_rule_is_not_segment_aware() {
        // "user" is a string prefix of "users.view"; the rule is inherited as-is.
        assert_eq!(eval("users.view", &["user"]), GrantState::Granted);
    }

    #[test]
    fn or_list_short_circuits_on_first_non_denied() {
        assert_eq!(
            eval(["roles.view", "users.view"], &["users.view", "roles.*"]),
            GrantState::Indeterminate
        );
        assert_eq!(
            eval(["materials.view", "users.view"], &["users.view", "roles.*"]),
            GrantState::Granted
        );
        assert_eq!(eval(["a.b", "c.d"], &["users.view"]), GrantState::Denied);
    }

    #[test]
    fn empty_request_list_is_denied() {
        assert_eq!(
            evaluate(&RequestedPermission::default(), &set(&["*"])),
            GrantState::Denied
        );
    }

    #[test]
    fn absent_grant_set_is_denied() {
        assert_eq!(evaluate_opt(&"users.view".into(), None), GrantState::Denied);
    }

    #[test]
    fn rules_are_independently_testable() {
        assert!(MatchRule::Exact.matches("users.*", "users.*"));
        assert!(!MatchRule::Exact.matches("users.view", "users.*"));

        assert!(MatchRule::WildcardBroadening.matches("users.view", "users.*"));
        assert!(!MatchRule::WildcardBroadening.matches("users.view", "users"));

        assert!(MatchRule::LegacyPrefix.matches("users.view", "users"));
        // Reachable only when the rule is applied on its own.
        assert!(MatchRule::LegacyPrefix.matches("users.view", "users.*"));
    }

    #[test]
    fn rule_outcomes() {
        assert_eq!(MatchRule::Exact.outcome(), GrantState::Granted);
        assert_eq!(MatchRule::WildcardBroadening.outcome(), GrantState::Indeterminate);
        assert_eq!(MatchRule::LegacyPrefix.outcome(), GrantState::Granted);
    }

    #[test]
    fn apply_returns_the_matching_trimmed_entry() {
        let granted = set(&["roles.view", " users.* "]);
        assert_eq!(MatchRule::WildcardBroadening.apply("users.create", &granted), Some("users.*"));
        assert_eq!(MatchRule::Exact.apply("users.create", &granted), None);
    }

    #[test]
    fn requested_permission_deserializes_from_string_or_list() {
        let one: RequestedPermission = serde_json::from_str("\"users.view\"").unwrap();
        assert_eq!(one, RequestedPermission::Single("users.view".to_string()));
        let many: RequestedPermission = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(many.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: nothing is granted by an empty set.
        #[test]
        fn empty_set_always_denies(p in "[a-z_*.]{0,24}") {
            prop_assert_eq!(eval(p.as_str(), &[]), GrantState::Denied);
        }

        /// Property: an exact grant is always granted, wildcard or not.
        #[test]
        fn exact_entry_always_grants(
            p in "[a-z_]{1,10}(\\.[a-z_*]{1,10}){0,3}",
            others in proptest::collection::vec("[a-z_*.]{0,16}", 0..6),
        ) {
            let mut granted: Vec<&str> = others.iter().map(String::as_str).collect();
            granted.push(p.as_str());
            prop_assert_eq!(eval(p.as_str(), &granted), GrantState::Granted);
        }

        /// Property: a wildcard covering the request yields Indeterminate when
        /// the request is not granted exactly.
        #[test]
        fn covering_wildcard_is_indeterminate(
            prefix in "[a-z_]{1,10}",
            leaf in "[a-z_]{1,10}",
        ) {
            let requested = format!("{prefix}.{leaf}");
            let wildcard = format!("{prefix}.*");
            prop_assert_eq!(eval(requested.as_str(), &[wildcard.as_str()]), GrantState::Indeterminate);
        }

        /// Property: a literal prefix grant yields Granted.
        #[test]
        fn literal_prefix_grants(
            prefix in "[a-z_]{1,10}",
            rest in "(\\.[a-z_]{1,10}){1,3}",
        ) {
            let requested = format!("{prefix}{rest}");
            prop_assert_eq!(eval(requested.as_str(), &[prefix.as_str()]), GrantState::Granted);
        }

        /// Property: evaluation is deterministic.
        #[test]
        fn evaluate_is_deterministic(
            p in "[a-z_*.]{0,16}",
            granted in proptest::collection::vec("[a-z_*. ]{0,16}", 0..8),
        ) {
            let refs: Vec<&str> = granted.iter().map(String::as_str).collect();
            prop_assert_eq!(eval(p.as_str(), &refs), eval(p.as_str(), &refs));
        }
    }
}
