//! Error types raised while resolving contexts and evaluating products.
#![forbid(unsafe_code)]

use hmum_core::ProductError;
use thiserror::Error;

/// Two contexts declared mutually exclusive were selected together.
///
/// The engine never picks one of the pair on the caller's behalf.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("contexts `{first}` and `{second}` are mutually exclusive")]
pub struct MutualExclusionError {
    /// First id of the pair, as declared.
    pub first: String,
    /// Second id of the pair, as declared.
    pub second: String,
}

/// A context selection that cannot be applied to a category.
///
/// Context errors abort a ranking before any product is evaluated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The selection names a context the category does not declare.
    #[error("category `{category}` has no context `{id}`")]
    UnknownContext {
        /// Category id.
        category: String,
        /// Requested context id.
        id: String,
    },
    /// The selection contains a declared mutually exclusive pair.
    #[error(transparent)]
    MutuallyExclusive(#[from] MutualExclusionError),
    /// The combined contexts reduce every attribute weight to zero.
    #[error("contexts [{}] leave every attribute weight at zero", contexts.join(", "))]
    DegenerateWeights {
        /// Active context ids in declaration order.
        contexts: Vec<String>,
    },
}

/// Failure of a single-product evaluation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvaluateError {
    /// The context selection was invalid.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// The product could not be scored.
    #[error(transparent)]
    Product(#[from] ProductError),
}
