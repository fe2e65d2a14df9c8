//! Core domain types for the HMUM scoring engine.
//!
//! This crate holds everything that describes *what* is scored: product fact
//! sheets, attribute definitions and their normalization curves, the
//! constraint predicate language, context profiles, and validated category
//! configurations together with the sources they are loaded from. Scoring
//! itself lives in `hmum-scorer`.
//!
//! Configuration is validated eagerly: a [`CategoryConfiguration`] can only
//! be obtained from a definition that passed every check, so downstream code
//! never re-validates weights, curves or references.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod attribute;
pub mod category;
pub mod constraint;
pub mod context;
pub mod error;
pub mod facts;
pub mod normalize;
pub mod predicate;
pub mod source;
pub mod weights;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use attribute::{
    AttributeDefinition, AttributeUtility, AttributeValueError, DataField, Direction,
    MissingValueStrategy, ValueSource,
};
pub use category::{AggregationMode, CategoryConfiguration, CategoryDefinition, validate_category_id};
pub use constraint::{HardConstraint, SoftConstraint};
pub use context::{ContextProfile, ContextSelection};
pub use error::{ConfigurationError, ProductError};
pub use facts::{FactValue, FieldPath, FieldPathError, ProductFactSheet, RawInput};
pub use normalize::{Breakpoint, Curve, CurveError, CurveInputError, NEUTRAL_UTILITY};
pub use predicate::{CompareOp, MAX_PREDICATE_DEPTH, Predicate};
pub use source::CategorySource;
#[cfg(feature = "source-fs")]
pub use source::{CONFIG_EXTENSION, DirectoryCategorySource, load_category_configuration};
pub use weights::{WEIGHT_SUM_TOLERANCE, WeightError, normalize_weights};
