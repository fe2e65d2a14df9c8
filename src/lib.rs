//! Facade crate for the HMUM contextual product scoring engine.
//!
//! This crate re-exports the configuration model from `hmum-core` and the
//! evaluation, ranking, and caching entry points from `hmum-scorer`. The
//! directory-backed category source is available behind the `source-fs`
//! feature.
//!
//! # Examples
//! ```
//! use hmum_engine::{CategoryConfiguration, ContextSelection, ProductFactSheet, rank_products};
//!
//! let category = CategoryConfiguration::from_json_str(r#"{
//!     "category_id": "kettles",
//!     "attributes": [{
//!         "id": "capacity",
//!         "data_field": { "fact": "capacity_l" },
//!         "weight": 1.0,
//!         "normalization": { "kind": "linear", "min": 0.5, "max": 2.0 },
//!         "missing_value_strategy": "fail"
//!     }]
//! }"#)?;
//! let products = [
//!     ProductFactSheet::new("small").with_fact("capacity_l", 0.8),
//!     ProductFactSheet::new("large").with_fact("capacity_l", 1.7),
//! ];
//!
//! let ranking = rank_products(&products, &category, &ContextSelection::general())?;
//! assert_eq!(ranking.ranked[0].product_id, "large");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use hmum_core::{
    AggregationMode, AttributeDefinition, CategoryConfiguration, CategoryDefinition,
    CategorySource, ConfigurationError, ContextProfile, ContextSelection, Curve, DataField,
    Direction, FactValue, HardConstraint, MissingValueStrategy, Predicate, ProductError,
    ProductFactSheet, SoftConstraint,
};

#[cfg(feature = "source-fs")]
#[cfg_attr(docsrs, doc(cfg(feature = "source-fs")))]
pub use hmum_core::{DirectoryCategorySource, load_category_configuration};

pub use hmum_scorer::{
    ContextError, EvaluateError, EvaluationCache, EvaluationResult, MutualExclusionError, Ranking,
    ResolvedContext, ScoreBreakdown, evaluate, list_available_contexts, rank_products,
    rank_products_cached, resolve_context,
};
