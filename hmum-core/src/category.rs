//! Category configuration: the raw schema and its validated form.
//!
//! [`CategoryDefinition`] mirrors the JSON files one to one.
//! [`CategoryConfiguration`] is only produced by validating a definition,
//! so code holding one never re-checks weights, curves or references.

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::predicate::MAX_PREDICATE_DEPTH;
use crate::weights::{WeightError, normalize_weights};
use crate::{
    AttributeDefinition, ConfigurationError, ContextProfile, HardConstraint,
    MissingValueStrategy, SoftConstraint,
};

/// How attribute utilities are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Weighted geometric mean; one weak attribute drags the whole score.
    #[default]
    Geometric,
    /// Weighted arithmetic mean; strengths compensate weaknesses.
    Arithmetic,
}

/// Raw, unvalidated category schema as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDefinition {
    /// Category identifier; also the configuration file stem.
    pub category_id: String,
    /// Human readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Aggregation mode.
    #[serde(default)]
    pub aggregation: AggregationMode,
    /// Ordered attributes; order only affects presentation.
    pub attributes: Vec<AttributeDefinition>,
    /// Disqualifying constraints.
    #[serde(default)]
    pub hard_constraints: Vec<HardConstraint>,
    /// Penalising constraints.
    #[serde(default)]
    pub soft_constraints: Vec<SoftConstraint>,
    /// Context profiles in declaration order.
    #[serde(default)]
    pub contexts: Vec<ContextProfile>,
    /// Context pairs that may not be selected together.
    #[serde(default)]
    pub mutually_exclusive: Vec<[String; 2]>,
}

/// A validated, immutable category configuration.
///
/// # Examples
/// ```
/// use hmum_core::{AggregationMode, CategoryConfiguration};
///
/// let category = CategoryConfiguration::from_json_str(r#"{
///     "category_id": "headphones",
///     "attributes": [
///         {
///             "id": "battery",
///             "data_field": { "fact": "battery.hours" },
///             "weight": 3.0,
///             "normalization": { "kind": "linear", "min": 0, "max": 40 },
///             "missing_value_strategy": "fail"
///         },
///         {
///             "id": "weight",
///             "data_field": { "fact": "weight_g" },
///             "weight": 1.0,
///             "direction": "minimize",
///             "normalization": { "kind": "linear", "min": 150, "max": 400 },
///             "missing_value_strategy": "impute_neutral"
///         }
///     ]
/// }"#).unwrap();
///
/// assert_eq!(category.aggregation(), AggregationMode::Geometric);
/// assert_eq!(category.base_weights(), &[0.75, 0.25]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CategoryDefinition", into = "CategoryDefinition")]
pub struct CategoryConfiguration {
    definition: CategoryDefinition,
    base_weights: Vec<f64>,
}

impl CategoryConfiguration {
    /// Decode and validate a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let definition: CategoryDefinition =
            serde_json::from_str(json).map_err(ConfigurationError::Parse)?;
        Self::try_from(definition)
    }

    /// Category identifier.
    #[must_use]
    pub fn category_id(&self) -> &str {
        &self.definition.category_id
    }

    /// Human readable name, falling back to the id.
    #[must_use]
    pub fn name(&self) -> &str {
        self.definition
            .name
            .as_deref()
            .unwrap_or(&self.definition.category_id)
    }

    /// Aggregation mode.
    #[must_use]
    pub const fn aggregation(&self) -> AggregationMode {
        self.definition.aggregation
    }

    /// Attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.definition.attributes
    }

    /// Attribute weights normalized to sum to one, aligned with
    /// [`Self::attributes`].
    #[must_use]
    pub fn base_weights(&self) -> &[f64] {
        &self.base_weights
    }

    /// Hard constraints in declaration order.
    #[must_use]
    pub fn hard_constraints(&self) -> &[HardConstraint] {
        &self.definition.hard_constraints
    }

    /// Soft constraints in declaration order.
    #[must_use]
    pub fn soft_constraints(&self) -> &[SoftConstraint] {
        &self.definition.soft_constraints
    }

    /// Context profiles in declaration order.
    #[must_use]
    pub fn contexts(&self) -> &[ContextProfile] {
        &self.definition.contexts
    }

    /// Look up a context by id.
    #[must_use]
    pub fn context(&self, id: &str) -> Option<&ContextProfile> {
        self.definition.contexts.iter().find(|c| c.id == id)
    }

    /// Declared mutually exclusive context pairs.
    #[must_use]
    pub fn mutually_exclusive(&self) -> &[[String; 2]] {
        &self.definition.mutually_exclusive
    }

    /// Borrow the underlying definition.
    #[must_use]
    pub const fn definition(&self) -> &CategoryDefinition {
        &self.definition
    }

    /// Weights under a set of active contexts, normalized to sum to one.
    ///
    /// `profiles` must be in category declaration order. Overrides apply
    /// first, with later contexts winning; multipliers then compound.
    pub fn effective_weights(&self, profiles: &[&ContextProfile]) -> Result<Vec<f64>, WeightError> {
        if profiles.is_empty() {
            return Ok(self.base_weights.clone());
        }
        let attributes = self.attributes();
        let mut raw: Vec<f64> = attributes.iter().map(|a| a.weight).collect();
        for profile in profiles {
            for (weight, attribute) in raw.iter_mut().zip(attributes) {
                if let Some(value) = profile.weight_overrides.get(&attribute.id) {
                    *weight = *value;
                }
            }
        }
        for profile in profiles {
            for (weight, attribute) in raw.iter_mut().zip(attributes) {
                if let Some(factor) = profile.weight_multipliers.get(&attribute.id) {
                    *weight *= factor;
                }
            }
        }
        normalize_weights(&raw)
    }
}

impl TryFrom<CategoryDefinition> for CategoryConfiguration {
    type Error = ConfigurationError;

    fn try_from(definition: CategoryDefinition) -> Result<Self, Self::Error> {
        validate_category_id(&definition.category_id)?;
        validate_references(&definition)?;
        let base: Vec<f64> = definition.attributes.iter().map(|a| a.weight).collect();
        let base_weights =
            normalize_weights(&base).map_err(|_| ConfigurationError::ZeroWeightSum {
                category: definition.category_id.clone(),
            })?;
        let configuration = Self {
            definition,
            base_weights,
        };
        for profile in configuration.contexts() {
            configuration.effective_weights(&[profile]).map_err(|_| {
                ConfigurationError::ContextZeroWeightSum {
                    context: profile.id.clone(),
                }
            })?;
        }
        debug!(
            "validated category `{}`: {} attributes, {} hard and {} soft constraints, {} contexts",
            configuration.category_id(),
            configuration.attributes().len(),
            configuration.hard_constraints().len(),
            configuration.soft_constraints().len(),
            configuration.contexts().len(),
        );
        Ok(configuration)
    }
}

impl From<CategoryConfiguration> for CategoryDefinition {
    fn from(configuration: CategoryConfiguration) -> Self {
        configuration.definition
    }
}

fn validate_references(definition: &CategoryDefinition) -> Result<(), ConfigurationError> {
    let attribute_ids = validate_attributes(definition)?;
    let context_ids = unique_ids("context", definition.contexts.iter().map(|c| c.id.as_str()))?;
    let soft_ids = validate_constraints(definition, &context_ids)?;
    for profile in &definition.contexts {
        validate_context(definition, profile, &attribute_ids, &soft_ids)?;
    }
    for [first, second] in &definition.mutually_exclusive {
        let known = context_ids.contains(first.as_str()) && context_ids.contains(second.as_str());
        if !known || first == second {
            return Err(ConfigurationError::InvalidExclusivePair {
                first: first.clone(),
                second: second.clone(),
            });
        }
    }
    Ok(())
}

fn validate_context(
    definition: &CategoryDefinition,
    profile: &ContextProfile,
    attribute_ids: &BTreeSet<&str>,
    soft_ids: &BTreeSet<&str>,
) -> Result<(), ConfigurationError> {
    let context = || profile.id.clone();
    let adjustments = profile
        .weight_multipliers
        .iter()
        .chain(&profile.weight_overrides);
    for (attribute, value) in adjustments {
        if !attribute_ids.contains(attribute.as_str()) {
            return Err(ConfigurationError::UnknownAttribute {
                context: context(),
                attribute: attribute.clone(),
            });
        }
        if !value.is_finite() || *value < 0.0 {
            return Err(ConfigurationError::InvalidWeight {
                attribute: attribute.clone(),
                value: *value,
            });
        }
    }
    for attribute in profile.weight_multipliers.keys() {
        let base_is_zero = definition
            .attributes
            .iter()
            .any(|a| &a.id == attribute && a.weight == 0.0);
        if base_is_zero && !profile.weight_overrides.contains_key(attribute) {
            warn!(
                "context `{}` multiplies attribute `{attribute}` whose weight is zero",
                profile.id
            );
        }
    }
    for constraint in profile
        .enable_soft_constraints
        .iter()
        .chain(&profile.disable_soft_constraints)
    {
        if !soft_ids.contains(constraint.as_str()) {
            return Err(ConfigurationError::UnknownSoftConstraint {
                context: context(),
                constraint: constraint.clone(),
            });
        }
    }
    if let Some(constraint) = profile
        .enable_soft_constraints
        .intersection(&profile.disable_soft_constraints)
        .next()
    {
        return Err(ConfigurationError::ConflictingToggle {
            context: context(),
            constraint: constraint.clone(),
        });
    }
    Ok(())
}

/// Check that a category id is non-empty and uses only `[a-z0-9_-]`.
///
/// The id doubles as a file stem, so this also rules out path separators.
pub fn validate_category_id(id: &str) -> Result<(), ConfigurationError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidCategoryId { id: id.to_owned() })
    }
}

fn unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<BTreeSet<&'a str>, ConfigurationError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(ConfigurationError::EmptyId { kind });
        }
        if !seen.insert(id) {
            return Err(ConfigurationError::DuplicateId {
                kind,
                id: id.to_owned(),
            });
        }
    }
    Ok(seen)
}

fn validate_attributes(definition: &CategoryDefinition) -> Result<BTreeSet<&str>, ConfigurationError> {
    if definition.attributes.is_empty() {
        return Err(ConfigurationError::NoAttributes {
            category: definition.category_id.clone(),
        });
    }
    let ids = unique_ids("attribute", definition.attributes.iter().map(|a| a.id.as_str()))?;
    for attribute in &definition.attributes {
        validate_attribute(attribute)?;
    }
    Ok(ids)
}

fn validate_attribute(attribute: &AttributeDefinition) -> Result<(), ConfigurationError> {
    let id = || attribute.id.clone();
    if !attribute.weight.is_finite() || attribute.weight < 0.0 {
        return Err(ConfigurationError::InvalidWeight {
            attribute: id(),
            value: attribute.weight,
        });
    }
    attribute
        .normalization
        .validate()
        .map_err(|source| ConfigurationError::Curve {
            attribute: id(),
            source,
        })?;
    match (&attribute.missing_value_strategy, &attribute.impute_value) {
        (MissingValueStrategy::ImputePenalty, None) => {
            return Err(ConfigurationError::MissingImputeValue { attribute: id() });
        }
        (MissingValueStrategy::ImputePenalty, Some(value)) => {
            attribute
                .normalization
                .utility(value.as_input(), attribute.direction)
                .map_err(|source| ConfigurationError::InvalidImputeValue {
                    attribute: id(),
                    source,
                })?;
        }
        (_, Some(_)) => warn!(
            "attribute `{}` sets impute_value but its strategy never imputes it",
            attribute.id
        ),
        (_, None) => {}
    }
    Ok(())
}

fn validate_constraints<'a>(
    definition: &'a CategoryDefinition,
    context_ids: &BTreeSet<&str>,
) -> Result<BTreeSet<&'a str>, ConfigurationError> {
    let hard = definition
        .hard_constraints
        .iter()
        .map(|c| (c.id.as_str(), &c.predicate));
    let soft = definition
        .soft_constraints
        .iter()
        .map(|c| (c.id.as_str(), &c.predicate));
    let all: Vec<_> = hard.chain(soft).collect();
    unique_ids("constraint", all.iter().map(|(id, _)| *id))?;
    for (constraint, predicate) in &all {
        let depth = predicate.depth();
        if depth > MAX_PREDICATE_DEPTH {
            return Err(ConfigurationError::PredicateTooDeep {
                constraint: (*constraint).to_owned(),
                depth,
                max: MAX_PREDICATE_DEPTH,
            });
        }
        if let Some(context) = predicate
            .referenced_contexts()
            .into_iter()
            .find(|id| !context_ids.contains(id))
        {
            return Err(ConfigurationError::UnknownContextReference {
                constraint: (*constraint).to_owned(),
                context: context.to_owned(),
            });
        }
    }
    for constraint in &definition.soft_constraints {
        let value = constraint.penalty_multiplier;
        if !(value > 0.0 && value < 1.0) {
            return Err(ConfigurationError::InvalidPenalty {
                constraint: constraint.id.clone(),
                value,
            });
        }
    }
    Ok(definition
        .soft_constraints
        .iter()
        .map(|c| c.id.as_str())
        .collect())
}
