//! Caller-owned memoization of evaluation results.
//!
//! The engine itself holds no state. Callers that re-rank the same products
//! keep an [`EvaluationCache`] and pass it to [`rank_products_cached`]; they
//! are responsible for invalidating entries when a category or product
//! changes. Products are identified by id.

use std::collections::BTreeMap;

use hmum_core::{CategoryConfiguration, ContextSelection, ProductError, ProductFactSheet};

use crate::context::resolve_context;
use crate::engine::evaluate_resolved;
use crate::evaluation::EvaluationResult;
use crate::ranking::{Ranking, rank_with};
use crate::ContextError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CacheKey {
    category: String,
    context: String,
    product: String,
}

/// Memoized evaluation results keyed by category, active contexts and
/// product id.
#[derive(Debug, Default, Clone)]
pub struct EvaluationCache {
    entries: BTreeMap<CacheKey, Result<EvaluationResult, ProductError>>,
    hits: u64,
    misses: u64,
}

impl EvaluationCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache since creation.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that required an evaluation since creation.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop every result computed under `category_id`.
    pub fn invalidate_category(&mut self, category_id: &str) {
        self.entries.retain(|key, _| key.category != category_id);
    }

    /// Drop every result computed for `product_id`.
    pub fn invalidate_product(&mut self, product_id: &str) {
        self.entries.retain(|key, _| key.product != product_id);
    }

    /// Drop every cached result.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn get_or_insert_with<F>(
        &mut self,
        key: CacheKey,
        evaluate: F,
    ) -> Result<EvaluationResult, ProductError>
    where
        F: FnOnce() -> Result<EvaluationResult, ProductError>,
    {
        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            return cached.clone();
        }
        self.misses += 1;
        let result = evaluate();
        self.entries.insert(key, result.clone());
        result
    }
}

/// [`rank_products`](crate::rank_products) backed by a caller-owned cache.
///
/// # Errors
/// Returns [`ContextError`] when the selection is invalid for `category`.
///
/// # Examples
/// ```
/// use hmum_core::{CategoryConfiguration, ContextSelection, ProductFactSheet};
/// use hmum_scorer::{EvaluationCache, rank_products_cached};
///
/// let category = CategoryConfiguration::from_json_str(r#"{
///     "category_id": "kettles",
///     "attributes": [{
///         "id": "capacity",
///         "data_field": { "fact": "capacity_l" },
///         "weight": 1.0,
///         "normalization": { "kind": "linear", "min": 0.5, "max": 2.0 },
///         "missing_value_strategy": "fail"
///     }]
/// }"#).unwrap();
/// let products = vec![ProductFactSheet::new("k1").with_fact("capacity_l", 1.7)];
/// let mut cache = EvaluationCache::new();
///
/// let first = rank_products_cached(&products, &category, &ContextSelection::general(), &mut cache).unwrap();
/// let second = rank_products_cached(&products, &category, &ContextSelection::general(), &mut cache).unwrap();
/// assert_eq!(first, second);
/// assert_eq!(cache.hits(), 1);
/// ```
pub fn rank_products_cached(
    products: &[ProductFactSheet],
    category: &CategoryConfiguration,
    selection: &ContextSelection,
    cache: &mut EvaluationCache,
) -> Result<Ranking, ContextError> {
    let context = resolve_context(category, selection)?;
    let context_key = context.key();
    Ok(rank_with(products, category, &context, |product| {
        let key = CacheKey {
            category: category.category_id().to_owned(),
            context: context_key.clone(),
            product: product.id.clone(),
        };
        cache.get_or_insert_with(key, || evaluate_resolved(product, category, &context))
    }))
}
