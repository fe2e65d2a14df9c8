//! Attribute definitions: one scored criterion of a category.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::{Curve, CurveInputError, NEUTRAL_UTILITY};
use crate::{FactValue, FieldPath, ProductFactSheet, RawInput};

/// Whether larger raw values are better or worse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Larger raw values yield higher utility.
    #[default]
    Maximize,
    /// Smaller raw values yield higher utility.
    Minimize,
}

/// What to do when a product lacks an attribute's value.
///
/// There is deliberately no default: every attribute states its policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValueStrategy {
    /// Substitute the attribute's `impute_value` and run it through the curve.
    ImputePenalty,
    /// Use [`NEUTRAL_UTILITY`] without running the curve.
    ImputeNeutral,
    /// Report the product as unscorable.
    Fail,
}

/// Where an attribute reads its raw value from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataField {
    /// A dotted path into the product's facts.
    Fact(FieldPath),
    /// The product's editorial `base_score`.
    BaseScore,
}

impl DataField {
    /// Resolve the raw value for `product`.
    #[must_use]
    pub fn resolve<'a>(&self, product: &'a ProductFactSheet) -> RawInput<'a> {
        match self {
            Self::Fact(path) => product
                .lookup(path)
                .map_or(RawInput::Absent, FactValue::as_input),
            Self::BaseScore => product
                .base_score
                .map_or(RawInput::Absent, RawInput::Number),
        }
    }
}

/// One criterion of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeDefinition {
    /// Identifier unique within the category.
    pub id: String,
    /// Human readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Source of the raw value.
    pub data_field: DataField,
    /// Non-negative relative importance before normalization.
    pub weight: f64,
    /// Whether larger values are better.
    #[serde(default)]
    pub direction: Direction,
    /// Curve mapping the raw value to utility.
    pub normalization: Curve,
    /// Policy for absent values.
    pub missing_value_strategy: MissingValueStrategy,
    /// Raw value substituted under [`MissingValueStrategy::ImputePenalty`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impute_value: Option<FactValue>,
}

/// How an attribute's utility was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Read from the fact sheet.
    Observed,
    /// Missing; the configured penalty value was normalized instead.
    ImputedPenalty,
    /// Missing; the neutral utility was used.
    ImputedNeutral,
}

/// A normalized attribute utility with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeUtility {
    /// Utility in `[0, 1]`.
    pub utility: f64,
    /// Provenance of the value.
    pub source: ValueSource,
}

/// Why an attribute could not be normalized for a product.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AttributeValueError {
    /// The value was absent and the strategy is `fail`.
    #[error("value is missing")]
    Missing,
    /// The value (or the imputed substitute) could not be normalized.
    #[error(transparent)]
    Invalid(#[from] CurveInputError),
}

impl AttributeDefinition {
    /// Compute the attribute's utility for `product`, applying the missing
    /// value policy.
    ///
    /// # Examples
    /// ```
    /// use hmum_core::{AttributeDefinition, ProductFactSheet, ValueSource};
    ///
    /// let attribute: AttributeDefinition = serde_json::from_str(r#"{
    ///     "id": "battery",
    ///     "data_field": { "fact": "battery.hours" },
    ///     "weight": 2.0,
    ///     "normalization": { "kind": "linear", "min": 0.0, "max": 40.0 },
    ///     "missing_value_strategy": "impute_neutral"
    /// }"#).unwrap();
    ///
    /// let observed = ProductFactSheet::new("a").with_fact("battery.hours", 30.0);
    /// let scored = attribute.utility_for(&observed).unwrap();
    /// assert_eq!(scored.utility, 0.75);
    ///
    /// let missing = attribute.utility_for(&ProductFactSheet::new("b")).unwrap();
    /// assert_eq!(missing.source, ValueSource::ImputedNeutral);
    /// ```
    pub fn utility_for(
        &self,
        product: &ProductFactSheet,
    ) -> Result<AttributeUtility, AttributeValueError> {
        let input = self.data_field.resolve(product);
        if !matches!(input, RawInput::Absent) {
            let utility = self.normalization.utility(input, self.direction)?;
            return Ok(AttributeUtility {
                utility,
                source: ValueSource::Observed,
            });
        }
        match self.missing_value_strategy {
            MissingValueStrategy::Fail => Err(AttributeValueError::Missing),
            MissingValueStrategy::ImputeNeutral => Ok(AttributeUtility {
                utility: NEUTRAL_UTILITY,
                source: ValueSource::ImputedNeutral,
            }),
            MissingValueStrategy::ImputePenalty => {
                let input = self
                    .impute_value
                    .as_ref()
                    .map_or(RawInput::Absent, FactValue::as_input);
                let utility = self.normalization.utility(input, self.direction)?;
                Ok(AttributeUtility {
                    utility,
                    source: ValueSource::ImputedPenalty,
                })
            }
        }
    }

    /// Display label, falling back to the id.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}
