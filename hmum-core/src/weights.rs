//! Weight normalization.

use thiserror::Error;

/// Tolerance within which a weight set already counts as normalized.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Errors returned by [`normalize_weights`].
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum WeightError {
    /// A weight was negative, NaN, or infinite.
    #[error("weight at position {index} must be finite and non-negative, got {value}")]
    Invalid {
        /// Position in the input slice.
        index: usize,
        /// Offending value.
        value: f64,
    },
    /// Every weight was zero.
    #[error("weights sum to zero")]
    ZeroSum,
}

/// Rescale weights so they sum to `1.0`.
///
/// Sets already summing to `1.0` within [`WEIGHT_SUM_TOLERANCE`] are returned
/// unchanged, so normalizing twice is a no-op. When the raw sum overflows,
/// weights are first divided by the largest one.
///
/// # Examples
/// ```
/// use hmum_core::normalize_weights;
///
/// let weights = normalize_weights(&[2.0, 6.0]).unwrap();
/// assert_eq!(weights, vec![0.25, 0.75]);
/// assert_eq!(normalize_weights(&weights).unwrap(), weights);
/// assert_eq!(normalize_weights(&[1e308, 1e308]).unwrap(), vec![0.5, 0.5]);
/// ```
pub fn normalize_weights(weights: &[f64]) -> Result<Vec<f64>, WeightError> {
    if let Some((index, &value)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(WeightError::Invalid { index, value });
    }
    let largest = weights.iter().copied().fold(0.0_f64, f64::max);
    if largest <= 0.0 {
        return Err(WeightError::ZeroSum);
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() <= WEIGHT_SUM_TOLERANCE {
        return Ok(weights.to_vec());
    }
    if total.is_finite() {
        return Ok(weights.iter().map(|w| w / total).collect());
    }
    let scaled: Vec<f64> = weights.iter().map(|w| w / largest).collect();
    let scaled_total: f64 = scaled.iter().sum();
    Ok(scaled.iter().map(|w| w / scaled_total).collect())
}
