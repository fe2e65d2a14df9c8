//! Hard and soft constraints.

use serde::{Deserialize, Serialize};

use crate::Predicate;

/// A predicate that disqualifies a product when it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HardConstraint {
    /// Identifier unique within the category's constraints.
    pub id: String,
    /// Condition under which the product is disqualified.
    pub predicate: Predicate,
    /// Human readable reason reported with the disqualification.
    pub reason: String,
}

/// A predicate that multiplies the aggregate by `penalty_multiplier` when it
/// holds.
///
/// # Examples
/// ```
/// use hmum_core::SoftConstraint;
///
/// let constraint: SoftConstraint = serde_json::from_str(r#"{
///     "id": "no_hdmi_2_1",
///     "predicate": { "kind": "not", "predicate": { "kind": "is_true", "field": "ports.hdmi_2_1" } },
///     "penalty_multiplier": 0.85,
///     "reason": "No HDMI 2.1 ports",
///     "enabled_by_default": false
/// }"#).unwrap();
/// assert!(!constraint.enabled_by_default);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoftConstraint {
    /// Identifier unique within the category's constraints.
    pub id: String,
    /// Condition under which the penalty applies.
    pub predicate: Predicate,
    /// Multiplier in `(0, 1)`.
    pub penalty_multiplier: f64,
    /// Human readable reason reported with the penalty.
    pub reason: String,
    /// Active in general use; contexts may override.
    #[serde(default = "enabled_by_default")]
    pub enabled_by_default: bool,
}

const fn enabled_by_default() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn soft_constraints_default_to_enabled() {
        let constraint: SoftConstraint = serde_json::from_str(
            r#"{
                "id": "dim",
                "predicate": { "kind": "missing", "field": "display.peak_nits" },
                "penalty_multiplier": 0.9,
                "reason": "Brightness unknown"
            }"#,
        )
        .expect("valid constraint");
        assert!(constraint.enabled_by_default);
    }
}
