//! Context profiles and the caller's context selection.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A named user situation that re-weights criteria and toggles soft
/// constraints.
///
/// # Examples
/// ```
/// use hmum_core::ContextProfile;
///
/// let profile: ContextProfile = serde_json::from_str(r#"{
///     "id": "gaming",
///     "label": "Gaming",
///     "weight_multipliers": { "input_lag": 3.0 },
///     "enable_soft_constraints": ["slow_panel"]
/// }"#).unwrap();
/// assert_eq!(profile.weight_multipliers["input_lag"], 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextProfile {
    /// Identifier unique within the category.
    pub id: String,
    /// Human readable label.
    pub label: String,
    /// Optional longer explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Factor applied to an attribute's base weight.
    #[serde(default)]
    pub weight_multipliers: BTreeMap<String, f64>,
    /// Absolute base weight replacing the attribute's configured weight
    /// before multipliers apply.
    #[serde(default)]
    pub weight_overrides: BTreeMap<String, f64>,
    /// Soft constraints switched on while this context is active.
    #[serde(default)]
    pub enable_soft_constraints: BTreeSet<String>,
    /// Soft constraints switched off while this context is active.
    #[serde(default)]
    pub disable_soft_constraints: BTreeSet<String>,
}

/// The contexts a caller asks for: none (general use), one, or several.
///
/// Ids keep their first-seen order and duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContextSelection {
    ids: Vec<String>,
}

impl ContextSelection {
    /// General use: no context active.
    #[must_use]
    pub const fn general() -> Self {
        Self { ids: Vec::new() }
    }

    /// A single context.
    pub fn single(id: impl Into<String>) -> Self {
        Self { ids: vec![id.into()] }
    }

    /// Several contexts; duplicates are dropped.
    ///
    /// # Examples
    /// ```
    /// use hmum_core::ContextSelection;
    ///
    /// let selection = ContextSelection::from_ids(["gaming", "bright_room", "gaming"]);
    /// assert_eq!(selection.ids(), ["gaming", "bright_room"]);
    /// assert!(selection.contains("bright_room"));
    /// ```
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let ids = ids
            .into_iter()
            .map(Into::into)
            .filter(|id: &String| seen.insert(id.clone()))
            .collect();
        Self { ids }
    }

    /// Requested ids in first-seen order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Report whether no context is selected.
    #[must_use]
    pub fn is_general(&self) -> bool {
        self.ids.is_empty()
    }

    /// Report whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }
}

impl<'de> Deserialize<'de> for ContextSelection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer).map(Self::from_ids)
    }
}
