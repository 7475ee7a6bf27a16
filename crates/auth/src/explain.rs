//! Match explanations for debug tracing.

use serde::Serialize;

use crate::matcher::{decide, GrantState, MatchRule, RequestedPermission};
use crate::GrantedPermissionSet;

/// Detailed explanation of a matcher decision.
///
/// Answers "why did this guard show/hide?" when tracing is enabled. This is
/// not an audit record: the server remains the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchExplanation {
    /// The permissions that were requested (OR-list order).
    pub requested: Vec<String>,

    /// The resulting grant state.
    pub state: GrantState,

    /// The requested permission that decided the outcome, if any matched.
    pub decided_by: Option<String>,

    /// The rule that fired.
    pub rule: Option<MatchRule>,

    /// The (trimmed) granted entry that satisfied the rule.
    pub matched_grant: Option<String>,

    /// Human-readable reason for the decision.
    pub reason: String,
}

/// Explain why [`crate::evaluate`] returns what it returns.
///
/// # Returns
///
/// The same state `evaluate` would return, plus:
/// - which requested permission decided it
/// - which rule fired and on which granted entry
/// - a one-line reason
pub fn explain(requested: &RequestedPermission, granted: &GrantedPermissionSet) -> MatchExplanation {
    let requested_list: Vec<String> = requested.iter().map(str::to_string).collect();

    if granted.is_effectively_empty() {
        return MatchExplanation {
            requested: requested_list,
            state: GrantState::Denied,
            decided_by: None,
            rule: None,
            matched_grant: None,
            reason: "no permissions granted".to_string(),
        };
    }

    match decide(requested, granted) {
        Some(d) => {
            let reason = match d.rule {
                MatchRule::Exact => format!("'{}' is granted exactly", d.requested),
                MatchRule::WildcardBroadening => format!(
                    "'{}' is only covered by wildcard '{}' (not locally verifiable)",
                    d.requested, d.grant
                ),
                MatchRule::LegacyPrefix => {
                    format!("'{}' is covered by prefix grant '{}'", d.requested, d.grant)
                }
            };

            MatchExplanation {
                requested: requested_list,
                state: d.rule.outcome(),
                decided_by: Some(d.requested.to_string()),
                rule: Some(d.rule),
                matched_grant: Some(d.grant.to_string()),
                reason,
            }
        }
        None => {
            let reason = if requested_list.is_empty() {
                "no permission was requested".to_string()
            } else {
                format!("none of {:?} is covered by the granted set", requested_list)
            };

            MatchExplanation {
                requested: requested_list,
                state: GrantState::Denied,
                decided_by: None,
                rule: None,
                matched_grant: None,
                reason,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate;

    fn set(entries: &[&str]) -> GrantedPermissionSet {
        entries.iter().copied().collect()
    }

    #[test]
    fn explains_wildcard_broadening() {
        let requested = RequestedPermission::from(["roles.view", "users.view"]);
        let granted = set(&[" users.* "]);
        let explanation = explain(&requested, &granted);

        assert_eq!(explanation.state, GrantState::Indeterminate);
        assert_eq!(explanation.decided_by.as_deref(), Some("users.view"));
        assert_eq!(explanation.rule, Some(MatchRule::WildcardBroadening));
        assert_eq!(explanation.matched_grant.as_deref(), Some("users.*"));
        assert!(explanation.reason.contains("wildcard"));
    }

    #[test]
    fn explains_empty_grants() {
        let explanation = explain(&"users.view".into(), &set(&[""]));
        assert_eq!(explanation.state, GrantState::Denied);
        assert_eq!(explanation.reason, "no permissions granted");
    }

    #[test]
    fn explanation_state_agrees_with_evaluate() {
        let granted = set(&["users", "roles.*", "materials.view"]);
        for p in ["users.view", "roles.update", "materials.view", "products.view", ""] {
            let requested = RequestedPermission::from(p);
            assert_eq!(explain(&requested, &granted).state, evaluate(&requested, &granted));
        }
    }
}
