//! Errors raised while loading configuration and reading product values.

#[cfg(feature = "source-fs")]
use camino::Utf8PathBuf;
use thiserror::Error;

use crate::normalize::{CurveError, CurveInputError};

/// A category configuration that cannot be used.
///
/// Every variant is fatal at load time; a category that fails validation is
/// never handed to the scorer.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The category id is empty or contains characters outside `[a-z0-9_-]`.
    #[error("category id `{id}` must be non-empty and use only a-z, 0-9, `_` or `-`")]
    InvalidCategoryId {
        /// Offending id.
        id: String,
    },
    /// The category declares no attributes.
    #[error("category `{category}` declares no attributes")]
    NoAttributes {
        /// Category id.
        category: String,
    },
    /// An id was empty.
    #[error("{kind} id must not be empty")]
    EmptyId {
        /// What kind of item carried the id.
        kind: &'static str,
    },
    /// Two items of the same kind share an id.
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId {
        /// What kind of item carried the id.
        kind: &'static str,
        /// Repeated id.
        id: String,
    },
    /// A weight, override, or multiplier was negative or non-finite.
    #[error("weight for attribute `{attribute}` must be finite and non-negative, got {value}")]
    InvalidWeight {
        /// Attribute id.
        attribute: String,
        /// Offending value.
        value: f64,
    },
    /// The base attribute weights sum to zero.
    #[error("attribute weights of category `{category}` sum to zero")]
    ZeroWeightSum {
        /// Category id.
        category: String,
    },
    /// A single context leaves every attribute weight at zero.
    #[error("context `{context}` leaves every attribute weight at zero")]
    ContextZeroWeightSum {
        /// Context id.
        context: String,
    },
    /// A curve's parameters are invalid.
    #[error("attribute `{attribute}` has an invalid normalization curve")]
    Curve {
        /// Attribute id.
        attribute: String,
        /// Underlying problem.
        #[source]
        source: CurveError,
    },
    /// `impute_penalty` was chosen without an `impute_value`.
    #[error("attribute `{attribute}` uses impute_penalty but has no impute_value")]
    MissingImputeValue {
        /// Attribute id.
        attribute: String,
    },
    /// The `impute_value` cannot be normalized by the attribute's curve.
    #[error("attribute `{attribute}` has an impute_value its curve cannot normalize")]
    InvalidImputeValue {
        /// Attribute id.
        attribute: String,
        /// Underlying problem.
        #[source]
        source: CurveInputError,
    },
    /// A soft constraint's multiplier lies outside `(0, 1)`.
    #[error("soft constraint `{constraint}` penalty must lie strictly between 0 and 1, got {value}")]
    InvalidPenalty {
        /// Constraint id.
        constraint: String,
        /// Offending multiplier.
        value: f64,
    },
    /// A predicate nests deeper than the supported bound.
    #[error("constraint `{constraint}` nests predicates {depth} levels deep (max {max})")]
    PredicateTooDeep {
        /// Constraint id.
        constraint: String,
        /// Measured depth.
        depth: usize,
        /// Supported maximum.
        max: usize,
    },
    /// A constraint's `context` predicate names an undeclared context.
    #[error("constraint `{constraint}` refers to unknown context `{context}`")]
    UnknownContextReference {
        /// Constraint id.
        constraint: String,
        /// Unknown context id.
        context: String,
    },
    /// A context re-weights an undeclared attribute.
    #[error("context `{context}` refers to unknown attribute `{attribute}`")]
    UnknownAttribute {
        /// Context id.
        context: String,
        /// Unknown attribute id.
        attribute: String,
    },
    /// A context toggles an undeclared soft constraint.
    #[error("context `{context}` refers to unknown soft constraint `{constraint}`")]
    UnknownSoftConstraint {
        /// Context id.
        context: String,
        /// Unknown constraint id.
        constraint: String,
    },
    /// A context both enables and disables the same soft constraint.
    #[error("context `{context}` both enables and disables soft constraint `{constraint}`")]
    ConflictingToggle {
        /// Context id.
        context: String,
        /// Constraint id.
        constraint: String,
    },
    /// A mutually exclusive pair names an unknown context or the same one twice.
    #[error("mutually exclusive pair [`{first}`, `{second}`] must name two distinct declared contexts")]
    InvalidExclusivePair {
        /// First id as declared.
        first: String,
        /// Second id as declared.
        second: String,
    },
    /// Inline JSON could not be decoded.
    #[error("failed to parse category configuration")]
    Parse(#[source] serde_json::Error),
    /// No configuration exists for the requested category.
    #[error("unknown category `{id}`")]
    UnknownCategory {
        /// Requested id.
        id: String,
    },
    /// The file's `category_id` does not match the id it was loaded under.
    #[error("category file for `{expected}` declares category_id `{found}`")]
    CategoryIdMismatch {
        /// Id requested by the caller (the file stem).
        expected: String,
        /// Id declared inside the file.
        found: String,
    },
    /// A configuration file could not be read.
    #[cfg(feature = "source-fs")]
    #[error("failed to read category configuration at {path}")]
    ReadFile {
        /// File path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A configuration file was not valid JSON for the schema.
    #[cfg(feature = "source-fs")]
    #[error("failed to parse category configuration at {path}")]
    ParseFile {
        /// File path.
        path: Utf8PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// A file was decoded but failed validation.
    #[cfg(feature = "source-fs")]
    #[error("invalid category configuration at {path}")]
    InvalidFile {
        /// File path.
        path: Utf8PathBuf,
        /// Validation failure.
        #[source]
        source: Box<ConfigurationError>,
    },
    /// The configuration directory could not be listed.
    #[cfg(feature = "source-fs")]
    #[error("failed to list category configurations in {path}")]
    ListDirectory {
        /// Directory path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// A product that cannot be scored under the requested configuration.
///
/// Product errors are reported per product and never abort a ranking batch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// A `fail`-strategy attribute was absent.
    #[error("product `{product}` is missing required attribute `{attribute}`")]
    MissingRequiredAttribute {
        /// Product id.
        product: String,
        /// Attribute id.
        attribute: String,
    },
    /// A value was present but unusable by the attribute's curve.
    #[error("product `{product}` has an invalid value for attribute `{attribute}`: {source}")]
    InvalidAttributeValue {
        /// Product id.
        product: String,
        /// Attribute id.
        attribute: String,
        /// What the curve expected and found.
        source: CurveInputError,
    },
}

impl ProductError {
    /// Id of the product that failed.
    #[must_use]
    pub fn product_id(&self) -> &str {
        match self {
            Self::MissingRequiredAttribute { product, .. }
            | Self::InvalidAttributeValue { product, .. } => product,
        }
    }

    /// Id of the attribute that failed.
    #[must_use]
    pub fn attribute_id(&self) -> &str {
        match self {
            Self::MissingRequiredAttribute { attribute, .. }
            | Self::InvalidAttributeValue { attribute, .. } => attribute,
        }
    }
}
