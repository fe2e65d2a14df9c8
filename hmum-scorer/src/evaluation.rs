//! Evaluation results.
//!
//! A disqualified product carries reasons instead of a score, so it cannot be
//! ranked by accident.

use std::collections::BTreeMap;

use hmum_core::{AggregationMode, ValueSource};
use serde::Serialize;

use crate::aggregate::round_for_display;

/// One attribute's contribution to a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeScore {
    /// Attribute id.
    pub attribute_id: String,
    /// Normalized utility in `[0, 1]`.
    pub utility: f64,
    /// Effective weight after context adjustment and normalization.
    pub weight: f64,
    /// Whether the value was observed or imputed.
    pub source: ValueSource,
}

/// A soft constraint that fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedPenalty {
    /// Constraint id.
    pub constraint_id: String,
    /// Multiplier applied to the aggregate.
    pub multiplier: f64,
    /// Human readable reason.
    pub reason: String,
}

/// A hard constraint that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FatalReason {
    /// Constraint id.
    pub constraint_id: String,
    /// Human readable reason.
    pub reason: String,
}

/// Explainable breakdown of a scored product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Product id.
    pub product_id: String,
    /// Final score on the `0..=10` scale, full precision.
    pub score: f64,
    /// Final utility in `[0, 1]` after penalties.
    pub utility: f64,
    /// Aggregate utility before penalties.
    pub base_aggregate: f64,
    /// Aggregation mode used.
    pub aggregation: AggregationMode,
    /// Contributions of the active attributes, in declaration order.
    pub attributes: Vec<AttributeScore>,
    /// Soft constraints that fired, in declaration order.
    pub applied_penalties: Vec<AppliedPenalty>,
}

impl ScoreBreakdown {
    /// Score rounded to one decimal for display and ranking.
    #[must_use]
    pub fn display_score(&self) -> f64 {
        round_for_display(self.score)
    }

    /// Utility per attribute id.
    #[must_use]
    pub fn per_attribute_utility(&self) -> BTreeMap<&str, f64> {
        self.attributes
            .iter()
            .map(|attribute| (attribute.attribute_id.as_str(), attribute.utility))
            .collect()
    }
}

/// A product removed from ranking by hard constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disqualification {
    /// Product id.
    pub product_id: String,
    /// Every hard constraint that fired, in declaration order.
    pub fatal_reasons: Vec<FatalReason>,
}

/// Outcome of evaluating one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationResult {
    /// The product passed every hard constraint and was scored.
    Scored(ScoreBreakdown),
    /// At least one hard constraint fired.
    Disqualified(Disqualification),
}

impl EvaluationResult {
    /// Report whether a hard constraint disqualified the product.
    #[must_use]
    pub const fn is_fatally_constrained(&self) -> bool {
        matches!(self, Self::Disqualified(_))
    }

    /// Full-precision score, absent for disqualified products.
    #[must_use]
    pub const fn score(&self) -> Option<f64> {
        match self {
            Self::Scored(breakdown) => Some(breakdown.score),
            Self::Disqualified(_) => None,
        }
    }

    /// Breakdown of a scored product.
    #[must_use]
    pub const fn breakdown(&self) -> Option<&ScoreBreakdown> {
        match self {
            Self::Scored(breakdown) => Some(breakdown),
            Self::Disqualified(_) => None,
        }
    }

    /// Hard constraint hits; empty for scored products.
    #[must_use]
    pub fn fatal_reasons(&self) -> &[FatalReason] {
        match self {
            Self::Scored(_) => &[],
            Self::Disqualified(disqualification) => &disqualification.fatal_reasons,
        }
    }

    /// Id of the evaluated product.
    #[must_use]
    pub fn product_id(&self) -> &str {
        match self {
            Self::Scored(breakdown) => &breakdown.product_id,
            Self::Disqualified(disqualification) => &disqualification.product_id,
        }
    }
}
