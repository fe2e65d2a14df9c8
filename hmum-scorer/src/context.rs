//! Context resolution: turning a caller's selection into effective weights
//! and an active soft-constraint set.

use std::collections::BTreeSet;

use hmum_core::{CategoryConfiguration, ContextProfile, ContextSelection};
use log::debug;

use crate::{ContextError, MutualExclusionError};

/// Cache and display key used when no context is active.
pub const GENERAL_CONTEXT_KEY: &str = "general";

/// A validated context selection bound to one category.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContext {
    active: ContextSelection,
    weights: Vec<f64>,
    soft_constraints: BTreeSet<String>,
}

impl ResolvedContext {
    /// Active context ids in category declaration order.
    #[must_use]
    pub const fn active_contexts(&self) -> &ContextSelection {
        &self.active
    }

    /// Effective attribute weights, aligned with the category's attributes
    /// and summing to one.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Report whether the soft constraint `id` is active.
    #[must_use]
    pub fn is_soft_constraint_active(&self, id: &str) -> bool {
        self.soft_constraints.contains(id)
    }

    /// Stable key for the active contexts, e.g. `"gaming+bright_room"`.
    #[must_use]
    pub fn key(&self) -> String {
        if self.active.is_general() {
            GENERAL_CONTEXT_KEY.to_owned()
        } else {
            self.active.ids().join("+")
        }
    }
}

/// Return the first declared exclusive pair fully contained in `selection`.
///
/// # Errors
/// Returns [`MutualExclusionError`] naming both ids in declaration order.
pub fn check_mutual_exclusion(
    category: &CategoryConfiguration,
    selection: &ContextSelection,
) -> Result<(), MutualExclusionError> {
    match category
        .mutually_exclusive()
        .iter()
        .find(|[first, second]| selection.contains(first) && selection.contains(second))
    {
        Some([first, second]) => Err(MutualExclusionError {
            first: first.clone(),
            second: second.clone(),
        }),
        None => Ok(()),
    }
}

/// Validate `selection` against `category` and compute its effect.
///
/// Several compatible contexts apply in category declaration order: later
/// weight overrides win, multipliers compound, and later soft-constraint
/// toggles override earlier ones.
///
/// # Errors
/// Returns [`ContextError`] for unknown ids, exclusive pairs, or a
/// combination that zeroes every weight.
pub fn resolve_context(
    category: &CategoryConfiguration,
    selection: &ContextSelection,
) -> Result<ResolvedContext, ContextError> {
    if let Some(unknown) = selection
        .ids()
        .iter()
        .find(|id| category.context(id).is_none())
    {
        return Err(ContextError::UnknownContext {
            category: category.category_id().to_owned(),
            id: unknown.clone(),
        });
    }
    check_mutual_exclusion(category, selection)?;

    let profiles: Vec<&ContextProfile> = category
        .contexts()
        .iter()
        .filter(|profile| selection.contains(&profile.id))
        .collect();
    let active = ContextSelection::from_ids(profiles.iter().map(|profile| profile.id.clone()));
    let weights = category
        .effective_weights(&profiles)
        .map_err(|_| ContextError::DegenerateWeights {
            contexts: active.ids().to_vec(),
        })?;
    let soft_constraints = category
        .soft_constraints()
        .iter()
        .filter(|constraint| {
            profiles.iter().fold(constraint.enabled_by_default, |enabled, profile| {
                if profile.enable_soft_constraints.contains(&constraint.id) {
                    true
                } else if profile.disable_soft_constraints.contains(&constraint.id) {
                    false
                } else {
                    enabled
                }
            })
        })
        .map(|constraint| constraint.id.clone())
        .collect();

    let resolved = ResolvedContext {
        active,
        weights,
        soft_constraints,
    };
    debug!(
        "resolved context `{}` for category `{}`",
        resolved.key(),
        category.category_id()
    );
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmum_core::CategoryDefinition;
    use rstest::{fixture, rstest};

    #[fixture]
    fn category() -> CategoryConfiguration {
        let definition: CategoryDefinition = serde_json::from_value(serde_json::json!({
            "category_id": "tv",
            "attributes": [
                {
                    "id": "brightness",
                    "data_field": { "fact": "brightness" },
                    "weight": 1.0,
                    "normalization": { "kind": "linear", "min": 0, "max": 10 },
                    "missing_value_strategy": "impute_neutral"
                },
                {
                    "id": "contrast",
                    "data_field": { "fact": "contrast" },
                    "weight": 1.0,
                    "normalization": { "kind": "linear", "min": 0, "max": 10 },
                    "missing_value_strategy": "impute_neutral"
                }
            ],
            "soft_constraints": [
                {
                    "id": "glare",
                    "predicate": { "kind": "is_true", "field": "glossy" },
                    "penalty_multiplier": 0.8,
                    "reason": "Glossy screen",
                    "enabled_by_default": false
                }
            ],
            "contexts": [
                {
                    "id": "bright_room",
                    "label": "Bright room",
                    "weight_multipliers": { "brightness": 3.0 },
                    "enable_soft_constraints": ["glare"]
                },
                {
                    "id": "dark_room",
                    "label": "Dark room",
                    "weight_multipliers": { "contrast": 3.0 }
                },
                {
                    "id": "matte_cover",
                    "label": "Matte cover",
                    "disable_soft_constraints": ["glare"]
                }
            ],
            "mutually_exclusive": [["bright_room", "dark_room"]]
        }))
        .expect("valid definition");
        CategoryConfiguration::try_from(definition).expect("valid category")
    }

    #[rstest]
    fn general_use_keeps_base_weights(category: CategoryConfiguration) {
        let resolved =
            resolve_context(&category, &ContextSelection::general()).expect("general context");
        assert_eq!(resolved.weights(), category.base_weights());
        assert_eq!(resolved.key(), GENERAL_CONTEXT_KEY);
        assert!(!resolved.is_soft_constraint_active("glare"));
    }

    #[rstest]
    fn contexts_apply_in_declaration_order(category: CategoryConfiguration) {
        let selection = ContextSelection::from_ids(["matte_cover", "bright_room"]);
        let resolved = resolve_context(&category, &selection).expect("compatible contexts");
        assert_eq!(resolved.key(), "bright_room+matte_cover");
        assert!(!resolved.is_soft_constraint_active("glare"));
        assert_eq!(resolved.weights(), &[0.75, 0.25]);
    }

    #[rstest]
    fn enabling_context_activates_soft_constraint(category: CategoryConfiguration) {
        let resolved = resolve_context(&category, &ContextSelection::single("bright_room"))
            .expect("single context");
        assert!(resolved.is_soft_constraint_active("glare"));
    }

    #[rstest]
    fn unknown_context_is_rejected(category: CategoryConfiguration) {
        let err = resolve_context(&category, &ContextSelection::single("outdoor"))
            .expect_err("unknown context");
        assert_eq!(
            err,
            ContextError::UnknownContext {
                category: "tv".into(),
                id: "outdoor".into()
            }
        );
    }

    #[rstest]
    fn exclusive_pair_is_reported_in_declaration_order(category: CategoryConfiguration) {
        let selection = ContextSelection::from_ids(["dark_room", "bright_room"]);
        let err = resolve_context(&category, &selection).expect_err("exclusive contexts");
        assert_eq!(
            err,
            ContextError::MutuallyExclusive(MutualExclusionError {
                first: "bright_room".into(),
                second: "dark_room".into(),
            })
        );
    }
}
