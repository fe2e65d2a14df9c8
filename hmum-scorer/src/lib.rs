//! Scoring and ranking for HMUM category configurations.
//!
//! The crate turns validated [`CategoryConfiguration`]s from `hmum-core` and
//! product fact sheets into explainable scores:
//! - **Context resolution** validates a caller's context selection, rejects
//!   mutually exclusive pairs, and derives effective weights and the active
//!   soft-constraint set.
//! - **Evaluation** checks hard constraints first, normalizes each active
//!   attribute, aggregates (geometric by default), and compounds soft
//!   penalties into a `0..=10` score.
//! - **Ranking** evaluates a batch into a deterministic total order, keeping
//!   disqualified and unscorable products apart from the ranked list.
//!
//! Everything here is pure: no I/O, clocks, randomness or hidden caches.
//! Callers that want memoization own an [`EvaluationCache`].
//!
//! # Examples
//!
//! ```
//! use hmum_core::{CategoryConfiguration, ContextSelection, ProductFactSheet};
//! use hmum_scorer::rank_products;
//!
//! let category = CategoryConfiguration::from_json_str(r#"{
//!     "category_id": "headphones",
//!     "attributes": [
//!         {
//!             "id": "battery",
//!             "data_field": { "fact": "battery_hours" },
//!             "weight": 1.0,
//!             "normalization": { "kind": "linear", "min": 0, "max": 40 },
//!             "missing_value_strategy": "impute_neutral"
//!         }
//!     ],
//!     "hard_constraints": [{
//!         "id": "wired_only",
//!         "predicate": { "kind": "is_true", "field": "wired_only" },
//!         "reason": "Not wireless"
//!     }]
//! }"#).unwrap();
//!
//! let products = vec![
//!     ProductFactSheet::new("short").with_fact("battery_hours", 10.0),
//!     ProductFactSheet::new("long").with_fact("battery_hours", 30.0),
//!     ProductFactSheet::new("cable").with_fact("wired_only", true),
//! ];
//! let ranking = rank_products(&products, &category, &ContextSelection::general()).unwrap();
//!
//! assert_eq!(ranking.ranked[0].product_id, "long");
//! assert_eq!(ranking.excluded[0].product_id, "cable");
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod aggregate;
mod cache;
pub mod constraints;
mod context;
mod engine;
mod error;
mod evaluation;
mod ranking;

pub use aggregate::{SCORE_SCALE, UTILITY_FLOOR};
pub use cache::{EvaluationCache, rank_products_cached};
pub use context::{GENERAL_CONTEXT_KEY, ResolvedContext, check_mutual_exclusion, resolve_context};
pub use engine::{evaluate, evaluate_resolved};
pub use error::{ContextError, EvaluateError, MutualExclusionError};
pub use evaluation::{
    AppliedPenalty, AttributeScore, Disqualification, EvaluationResult, FatalReason,
    ScoreBreakdown,
};
pub use ranking::{ExcludedEntry, FailedEntry, RankedEntry, Ranking, rank_products};

use hmum_core::{CategoryConfiguration, ContextProfile};

/// Context profiles a caller may select for `category`, in declaration
/// order.
#[must_use]
pub fn list_available_contexts(category: &CategoryConfiguration) -> &[ContextProfile] {
    category.contexts()
}
