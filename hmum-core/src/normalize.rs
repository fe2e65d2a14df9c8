//! Normalization curves mapping raw attribute values onto `[0, 1]` utility.
//!
//! Every numeric curve is defined as non-decreasing in its input; the
//! attribute's [`Direction`] flips it for "lower is better" attributes.
//! Boolean and categorical curves state their utilities directly and ignore
//! direction. All results are clamped because the sigmoid and log-normal
//! evaluations can overshoot the unit interval by an epsilon.

use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RawInput;
use crate::attribute::Direction;

/// Utility assigned when an attribute is missing and its strategy is
/// `impute_neutral`.
pub const NEUTRAL_UTILITY: f64 = 0.5;

/// A single point on a piecewise linear curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Raw attribute value.
    pub input: f64,
    /// Utility at `input`, in `[0, 1]`.
    pub utility: f64,
}

/// Curve kind plus parameters, tagged by `kind` in configuration files.
///
/// # Examples
/// ```
/// use hmum_core::{Curve, Direction, RawInput};
///
/// let curve: Curve = serde_json::from_str(
///     r#"{ "kind": "sigmoid", "midpoint": 50.0, "steepness": 0.1 }"#,
/// ).unwrap();
/// let utility = curve.utility(RawInput::Number(50.0), Direction::Maximize).unwrap();
/// assert!((utility - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    /// `clamp((v - min) / (max - min))`.
    Linear {
        /// Value mapped to utility 0.
        min: f64,
        /// Value mapped to utility 1.
        max: f64,
    },
    /// Logistic curve centred on `midpoint`.
    Sigmoid {
        /// Value mapped to utility 0.5.
        midpoint: f64,
        /// Positive steepness `k`.
        steepness: f64,
    },
    /// Cumulative distribution function of a log-normal distribution.
    LogNormal {
        /// Mean of the underlying normal distribution.
        mu: f64,
        /// Positive standard deviation of the underlying normal distribution.
        sigma: f64,
    },
    /// Two configured utilities for present/true and absent/false.
    Boolean {
        /// Utility when the flag is true or the value is present.
        when_true: f64,
        /// Utility when the flag is false.
        when_false: f64,
    },
    /// Linear interpolation between calibrated breakpoints.
    Piecewise {
        /// Breakpoints sorted by strictly ascending input.
        points: Vec<Breakpoint>,
    },
    /// Lookup table for enumerated strings.
    Categorical {
        /// Utility per level label.
        levels: BTreeMap<String, f64>,
        /// Utility for labels missing from `levels`; unknown labels are
        /// invalid values when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
    },
}

/// Structural problems with curve parameters, raised at load time.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CurveError {
    /// A parameter was NaN or infinite.
    #[error("curve parameter `{name}` must be finite")]
    NonFiniteParameter {
        /// Parameter name.
        name: &'static str,
    },
    /// `max` did not exceed `min`.
    #[error("linear curve requires max > min (min = {min}, max = {max})")]
    InvertedRange {
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },
    /// Sigmoid steepness was not positive.
    #[error("sigmoid steepness must be positive, got {steepness}")]
    NonPositiveSteepness {
        /// Configured steepness.
        steepness: f64,
    },
    /// Log-normal sigma was not positive.
    #[error("log-normal sigma must be positive, got {sigma}")]
    NonPositiveSigma {
        /// Configured sigma.
        sigma: f64,
    },
    /// A configured utility fell outside `[0, 1]`.
    #[error("utility `{name}` must lie within [0, 1], got {value}")]
    UtilityOutOfRange {
        /// Which utility was invalid.
        name: String,
        /// Configured value.
        value: f64,
    },
    /// Fewer than two breakpoints were supplied.
    #[error("piecewise curve needs at least two breakpoints")]
    TooFewBreakpoints,
    /// Breakpoint inputs were not strictly ascending.
    #[error("piecewise breakpoints must have strictly ascending inputs")]
    UnsortedBreakpoints,
    /// Breakpoint utilities decreased; direction expresses "lower is better".
    #[error("piecewise utilities must be non-decreasing; use direction to invert")]
    DecreasingBreakpoints,
    /// A categorical curve had no levels.
    #[error("categorical curve needs at least one level")]
    EmptyLevels,
}

/// A raw value a curve cannot interpret.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CurveInputError {
    /// The value had the wrong kind for the curve.
    #[error("expected {expected}, found {found}")]
    UnexpectedKind {
        /// Kind the curve accepts.
        expected: &'static str,
        /// Kind found in the fact sheet.
        found: &'static str,
    },
    /// The value was NaN or infinite.
    #[error("value must be finite")]
    NonFinite,
    /// A categorical label had no configured utility and no default.
    #[error("unknown level `{level}`")]
    UnknownLevel {
        /// Label found in the fact sheet.
        level: String,
    },
}

impl Curve {
    /// Validate the curve parameters.
    pub fn validate(&self) -> Result<(), CurveError> {
        match self {
            Self::Linear { min, max } => {
                require_finite("min", *min)?;
                require_finite("max", *max)?;
                if max <= min {
                    return Err(CurveError::InvertedRange {
                        min: *min,
                        max: *max,
                    });
                }
            }
            Self::Sigmoid {
                midpoint,
                steepness,
            } => {
                require_finite("midpoint", *midpoint)?;
                require_finite("steepness", *steepness)?;
                if *steepness <= 0.0 {
                    return Err(CurveError::NonPositiveSteepness {
                        steepness: *steepness,
                    });
                }
            }
            Self::LogNormal { mu, sigma } => {
                require_finite("mu", *mu)?;
                require_finite("sigma", *sigma)?;
                if *sigma <= 0.0 {
                    return Err(CurveError::NonPositiveSigma { sigma: *sigma });
                }
            }
            Self::Boolean {
                when_true,
                when_false,
            } => {
                require_unit("when_true", *when_true)?;
                require_unit("when_false", *when_false)?;
            }
            Self::Piecewise { points } => validate_breakpoints(points)?,
            Self::Categorical { levels, default } => {
                if levels.is_empty() {
                    return Err(CurveError::EmptyLevels);
                }
                for (level, utility) in levels {
                    require_unit(level, *utility)?;
                }
                if let Some(value) = default {
                    require_unit("default", *value)?;
                }
            }
        }
        Ok(())
    }

    /// Report whether the curve is driven by a numeric input and therefore
    /// honours [`Direction`].
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Linear { .. } | Self::Sigmoid { .. } | Self::LogNormal { .. } | Self::Piecewise { .. }
        )
    }

    /// Map a raw input onto `[0, 1]`.
    ///
    /// Numeric curves accept numbers and numeric strings. Boolean curves
    /// accept flags, numbers (`!= 0`), non-empty strings, and structured
    /// values (present). Categorical curves accept strings and flags.
    pub fn utility(&self, input: RawInput<'_>, direction: Direction) -> Result<f64, CurveInputError> {
        let utility = match self {
            Self::Boolean {
                when_true,
                when_false,
            } => {
                if boolean_input(input)? {
                    *when_true
                } else {
                    *when_false
                }
            }
            Self::Categorical { levels, default } => {
                let label = categorical_input(input)?;
                levels
                    .get(label)
                    .copied()
                    .or(*default)
                    .ok_or_else(|| CurveInputError::UnknownLevel {
                        level: label.to_owned(),
                    })?
            }
            Self::Linear { min, max } => orient(linear(numeric_input(input)?, *min, *max), direction),
            Self::Sigmoid {
                midpoint,
                steepness,
            } => orient(
                sigmoid(numeric_input(input)?, *midpoint, *steepness),
                direction,
            ),
            Self::LogNormal { mu, sigma } => orient(
                log_normal_cdf(numeric_input(input)?, *mu, *sigma),
                direction,
            ),
            Self::Piecewise { points } => orient(piecewise(numeric_input(input)?, points), direction),
        };
        Ok(clamp_unit(utility))
    }
}

/// Clamp a utility into `[0, 1]`, mapping NaN to `0.0`.
///
/// # Examples
/// ```
/// use hmum_core::normalize::clamp_unit;
///
/// assert_eq!(clamp_unit(1.000_000_1), 1.0);
/// assert_eq!(clamp_unit(-0.2), 0.0);
/// assert_eq!(clamp_unit(f64::NAN), 0.0);
/// ```
#[must_use]
pub const fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Linear scaling between `min` and `max`, clamped.
#[must_use]
pub fn linear(value: f64, min: f64, max: f64) -> f64 {
    clamp_unit((value - min) / (max - min))
}

/// Logistic curve `1 / (1 + e^(-k (v - midpoint)))`.
#[must_use]
pub fn sigmoid(value: f64, midpoint: f64, steepness: f64) -> f64 {
    clamp_unit(1.0 / (1.0 + (-steepness * (value - midpoint)).exp()))
}

/// Log-normal CDF parameterised by the underlying normal's `mu` and `sigma`.
///
/// Non-positive values have zero probability mass below them and map to 0.
#[must_use]
pub fn log_normal_cdf(value: f64, mu: f64, sigma: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    let z = (value.ln() - mu) / (sigma * SQRT_2);
    clamp_unit(0.5 * libm::erfc(-z))
}

/// Piecewise linear interpolation. Values beyond the endpoints clamp to the
/// endpoint utilities.
#[must_use]
pub fn piecewise(value: f64, points: &[Breakpoint]) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if value <= first.input {
        return clamp_unit(first.utility);
    }
    for pair in points.windows(2) {
        let [lower, upper] = pair else {
            continue;
        };
        if value <= upper.input {
            let fraction = (value - lower.input) / (upper.input - lower.input);
            return clamp_unit(lower.utility + fraction * (upper.utility - lower.utility));
        }
    }
    clamp_unit(last.utility)
}

fn orient(utility: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Maximize => utility,
        Direction::Minimize => 1.0 - utility,
    }
}

fn numeric_input(input: RawInput<'_>) -> Result<f64, CurveInputError> {
    let value = match input {
        RawInput::Number(value) => value,
        RawInput::Text(text) => {
            text.trim()
                .parse::<f64>()
                .map_err(|_| CurveInputError::UnexpectedKind {
                    expected: "number",
                    found: "string",
                })?
        }
        other => {
            return Err(CurveInputError::UnexpectedKind {
                expected: "number",
                found: other.kind(),
            });
        }
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CurveInputError::NonFinite)
    }
}

fn boolean_input(input: RawInput<'_>) -> Result<bool, CurveInputError> {
    match input {
        RawInput::Bool(flag) => Ok(flag),
        RawInput::Number(value) if value.is_finite() => Ok(value != 0.0),
        RawInput::Number(_) => Err(CurveInputError::NonFinite),
        RawInput::Text(text) => Ok(!text.trim().is_empty()),
        RawInput::Structured { .. } => Ok(true),
        RawInput::Absent => Ok(false),
    }
}

fn categorical_input(input: RawInput<'_>) -> Result<&str, CurveInputError> {
    match input {
        RawInput::Text(text) => Ok(text.trim()),
        RawInput::Bool(true) => Ok("true"),
        RawInput::Bool(false) => Ok("false"),
        other => Err(CurveInputError::UnexpectedKind {
            expected: "string",
            found: other.kind(),
        }),
    }
}

fn require_finite(name: &'static str, value: f64) -> Result<(), CurveError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CurveError::NonFiniteParameter { name })
    }
}

fn require_unit(name: &str, value: f64) -> Result<(), CurveError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CurveError::UtilityOutOfRange {
            name: name.to_owned(),
            value,
        })
    }
}

fn validate_breakpoints(points: &[Breakpoint]) -> Result<(), CurveError> {
    if points.len() < 2 {
        return Err(CurveError::TooFewBreakpoints);
    }
    for point in points {
        require_finite("input", point.input)?;
        require_unit("utility", point.utility)?;
    }
    for pair in points.windows(2) {
        let [lower, upper] = pair else {
            continue;
        };
        if upper.input <= lower.input {
            return Err(CurveError::UnsortedBreakpoints);
        }
        if upper.utility < lower.utility {
            return Err(CurveError::DecreasingBreakpoints);
        }
    }
    Ok(())
}
