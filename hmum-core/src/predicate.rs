//! Declarative predicate language used by hard and soft constraints.
//!
//! Predicates are pure functions of a fact sheet and the active context
//! selection. Comparisons against absent or non-numeric facts are false.

use serde::{Deserialize, Serialize};

use crate::{ContextSelection, FactValue, FieldPath, ProductFactSheet};

/// Deepest predicate nesting accepted at load time.
pub const MAX_PREDICATE_DEPTH: usize = 8;

const COMPARE_TOLERANCE: f64 = 1e-9;

/// Numeric comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

impl CompareOp {
    /// Apply the operator to `lhs` and `rhs`.
    #[must_use]
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        let equal = (lhs - rhs).abs() <= COMPARE_TOLERANCE;
        match self {
            Self::Gt => lhs > rhs && !equal,
            Self::Gte => lhs > rhs || equal,
            Self::Lt => lhs < rhs && !equal,
            Self::Lte => lhs < rhs || equal,
            Self::Eq => equal,
            Self::Ne => !equal,
        }
    }
}

/// A typed boolean condition over a product and the active contexts.
///
/// # Examples
/// ```
/// use hmum_core::{ContextSelection, Predicate, ProductFactSheet};
///
/// let too_wide: Predicate = serde_json::from_str(r#"{
///     "kind": "all",
///     "predicates": [
///         { "kind": "compare", "field": "dimensions.width_cm", "op": "gt", "value": 120 },
///         { "kind": "context", "id": "small_room" }
///     ]
/// }"#).unwrap();
///
/// let product = ProductFactSheet::new("tv").with_fact("dimensions.width_cm", 145.0);
/// assert!(too_wide.matches(&product, &ContextSelection::single("small_room")));
/// assert!(!too_wide.matches(&product, &ContextSelection::general()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Predicate {
    /// Numeric comparison of a fact against a constant.
    Compare {
        /// Fact to read.
        field: FieldPath,
        /// Operator.
        op: CompareOp,
        /// Right-hand side.
        value: f64,
    },
    /// Fact equals a value (numbers compare by value).
    Equals {
        /// Fact to read.
        field: FieldPath,
        /// Expected value.
        value: FactValue,
    },
    /// Fact equals any of the listed values.
    OneOf {
        /// Fact to read.
        field: FieldPath,
        /// Accepted values.
        values: Vec<FactValue>,
    },
    /// Fact is the boolean `true`.
    IsTrue {
        /// Fact to read.
        field: FieldPath,
    },
    /// Fact is absent or `null`.
    Missing {
        /// Fact to read.
        field: FieldPath,
    },
    /// The named context is active.
    Context {
        /// Context id.
        id: String,
    },
    /// Every nested predicate holds. Empty is true.
    All {
        /// Conjuncts.
        predicates: Vec<Predicate>,
    },
    /// At least one nested predicate holds. Empty is false.
    Any {
        /// Disjuncts.
        predicates: Vec<Predicate>,
    },
    /// The nested predicate does not hold.
    Not {
        /// Negated predicate.
        predicate: Box<Predicate>,
    },
}

impl Predicate {
    /// Evaluate against a product and the active contexts.
    #[must_use]
    pub fn matches(&self, product: &ProductFactSheet, contexts: &ContextSelection) -> bool {
        match self {
            Self::Compare { field, op, value } => product
                .lookup(field)
                .and_then(FactValue::as_number)
                .is_some_and(|actual| op.apply(actual, *value)),
            Self::Equals { field, value } => product
                .lookup(field)
                .is_some_and(|actual| actual.matches(value)),
            Self::OneOf { field, values } => product
                .lookup(field)
                .is_some_and(|actual| values.iter().any(|value| actual.matches(value))),
            Self::IsTrue { field } => matches!(product.lookup(field), Some(FactValue::Bool(true))),
            Self::Missing { field } => product.lookup(field).is_none(),
            Self::Context { id } => contexts.contains(id),
            Self::All { predicates } => predicates.iter().all(|p| p.matches(product, contexts)),
            Self::Any { predicates } => predicates.iter().any(|p| p.matches(product, contexts)),
            Self::Not { predicate } => !predicate.matches(product, contexts),
        }
    }

    /// Nesting depth; leaves have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::All { predicates } | Self::Any { predicates } => {
                1 + predicates.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Not { predicate } => 1 + predicate.depth(),
            _ => 1,
        }
    }

    /// Context ids referenced anywhere in the predicate.
    #[must_use]
    pub fn referenced_contexts(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_contexts(&mut ids);
        ids
    }

    fn collect_contexts<'a>(&'a self, ids: &mut Vec<&'a str>) {
        match self {
            Self::Context { id } => {
                if !ids.contains(&id.as_str()) {
                    ids.push(id);
                }
            }
            Self::All { predicates } | Self::Any { predicates } => {
                for predicate in predicates {
                    predicate.collect_contexts(ids);
                }
            }
            Self::Not { predicate } => predicate.collect_contexts(ids),
            _ => {}
        }
    }
}
