//! Aggregation of attribute utilities into a final score.
//!
//! The geometric mean is computed in log space with every utility floored at
//! [`UTILITY_FLOOR`], so a single zero suppresses the score without zeroing
//! it. Penalties compound multiplicatively.

use hmum_core::AggregationMode;
use hmum_core::normalize::clamp_unit;

/// Smallest utility fed into the geometric mean.
pub const UTILITY_FLOOR: f64 = 1e-4;

/// Multiplier from final utility to the displayed score range.
pub const SCORE_SCALE: f64 = 10.0;

/// Weighted arithmetic mean `Σ uᵢ·wᵢ`.
///
/// `weights` must be aligned with `utilities` and sum to one.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "weighted sums are floating-point by nature"
)]
pub fn arithmetic_mean(utilities: &[f64], weights: &[f64]) -> f64 {
    let total = utilities
        .iter()
        .zip(weights)
        .map(|(utility, weight)| utility * weight)
        .sum();
    clamp_unit(total)
}

/// Weighted geometric mean `Π max(uᵢ, floor)^wᵢ`, computed as
/// `exp(Σ wᵢ·ln(max(uᵢ, floor)))`.
///
/// # Examples
/// ```
/// use hmum_scorer::aggregate::{UTILITY_FLOOR, geometric_mean};
///
/// let score = geometric_mean(&[1.0, 0.0], &[0.5, 0.5]);
/// assert!(score > 0.0);
/// assert!((score - UTILITY_FLOOR.sqrt()).abs() < 1e-12);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "log-space products are floating-point by nature"
)]
pub fn geometric_mean(utilities: &[f64], weights: &[f64]) -> f64 {
    let log_sum: f64 = utilities
        .iter()
        .zip(weights)
        .map(|(utility, weight)| weight * utility.max(UTILITY_FLOOR).ln())
        .sum();
    clamp_unit(log_sum.exp())
}

/// Aggregate with the given mode.
#[must_use]
pub fn aggregate(mode: AggregationMode, utilities: &[f64], weights: &[f64]) -> f64 {
    match mode {
        AggregationMode::Geometric => geometric_mean(utilities, weights),
        AggregationMode::Arithmetic => arithmetic_mean(utilities, weights),
    }
}

/// Multiply `base` by every penalty multiplier, clamped to `[0, 1]`.
///
/// # Examples
/// ```
/// use hmum_scorer::aggregate::apply_penalties;
///
/// let penalised = apply_penalties(0.5, [0.9, 0.8]);
/// assert!((penalised - 0.36).abs() < 1e-12);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "penalties compound multiplicatively"
)]
pub fn apply_penalties(base: f64, multipliers: impl IntoIterator<Item = f64>) -> f64 {
    clamp_unit(multipliers.into_iter().fold(base, |acc, m| acc * m))
}

/// Map a final utility onto the `0..=SCORE_SCALE` range.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "scaling to the display range")]
pub fn to_score(utility: f64) -> f64 {
    clamp_unit(utility) * SCORE_SCALE
}

/// Round a score to one decimal place.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "decimal rounding")]
pub fn round_for_display(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "tests compare floating-point results with tolerances"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TOLERANCE: f64 = 1e-9;

    #[rstest]
    fn arithmetic_mean_compensates() {
        let extreme = arithmetic_mean(&[1.0, 0.0], &[0.5, 0.5]);
        let balanced = arithmetic_mean(&[0.5, 0.5], &[0.5, 0.5]);
        assert!((extreme - 0.5).abs() < TOLERANCE);
        assert!((balanced - 0.5).abs() < TOLERANCE);
    }

    #[rstest]
    fn geometric_mean_penalises_weak_attributes() {
        let extreme = geometric_mean(&[1.0, 0.0], &[0.5, 0.5]);
        let balanced = geometric_mean(&[0.5, 0.5], &[0.5, 0.5]);
        assert!(extreme > 0.0);
        assert!(extreme < 0.02);
        assert!((balanced - 0.5).abs() < TOLERANCE);
    }

    #[rstest]
    fn zero_weight_attributes_do_not_contribute() {
        let score = geometric_mean(&[0.0, 0.64], &[0.0, 1.0]);
        assert!((score - 0.64).abs() < TOLERANCE);
    }

    #[rstest]
    fn penalties_compound_multiplicatively() {
        let penalised = apply_penalties(1.0, [0.9, 0.8]);
        assert!((penalised - 0.72).abs() < TOLERANCE);
        assert!((penalised - 0.7).abs() > 0.01);
    }

    #[rstest]
    #[case(7.25, 7.3)]
    #[case(7.24, 7.2)]
    #[case(10.0, 10.0)]
    #[case(0.04, 0.0)]
    fn rounds_to_one_decimal(#[case] score: f64, #[case] expected: f64) {
        assert!((round_for_display(score) - expected).abs() < TOLERANCE);
    }

    #[rstest]
    fn score_scale_maps_unit_to_ten() {
        assert!((to_score(1.0) - SCORE_SCALE).abs() < TOLERANCE);
        assert!(to_score(-0.5).abs() < TOLERANCE);
    }
}
