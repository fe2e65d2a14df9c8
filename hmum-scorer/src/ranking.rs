//! Ranking orchestration: evaluate a batch and order it totally.
//!
//! Ordering is rounded display score descending, then full-precision score
//! descending, then product id ascending, then input position ascending.
//! The same inputs always produce the same ranking.

use std::cmp::Ordering;

use hmum_core::{CategoryConfiguration, ContextSelection, ProductError, ProductFactSheet};
use log::debug;
use serde::{Serialize, Serializer};

use crate::context::{ResolvedContext, resolve_context};
use crate::engine::evaluate_resolved;
use crate::evaluation::{EvaluationResult, FatalReason, ScoreBreakdown};
use crate::ContextError;

/// A scored product with its position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// One-based position.
    pub rank: usize,
    /// Product id.
    pub product_id: String,
    /// Product display name, when the fact sheet has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Score rounded to one decimal.
    pub display_score: f64,
    /// Full breakdown.
    pub breakdown: ScoreBreakdown,
}

/// A product removed by hard constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedEntry {
    /// Product id.
    pub product_id: String,
    /// Every hard constraint that fired.
    pub fatal_reasons: Vec<FatalReason>,
}

/// A product that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedEntry {
    /// Product id.
    pub product_id: String,
    /// What went wrong.
    #[serde(serialize_with = "serialize_display")]
    pub error: ProductError,
}

/// Result of ranking a batch of products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    /// Category the batch was ranked under.
    pub category_id: String,
    /// Active contexts in declaration order.
    pub contexts: Vec<String>,
    /// Scored products in rank order.
    pub ranked: Vec<RankedEntry>,
    /// Disqualified products in input order.
    pub excluded: Vec<ExcludedEntry>,
    /// Unscorable products in input order.
    pub failed: Vec<FailedEntry>,
}

/// Rank `products` under a context selection.
///
/// Context errors abort before any product is evaluated. Product errors
/// never abort the batch; they are collected in [`Ranking::failed`].
///
/// # Errors
/// Returns [`ContextError`] when the selection is invalid for `category`.
pub fn rank_products(
    products: &[ProductFactSheet],
    category: &CategoryConfiguration,
    selection: &ContextSelection,
) -> Result<Ranking, ContextError> {
    let context = resolve_context(category, selection)?;
    Ok(rank_with(products, category, &context, |product| {
        evaluate_resolved(product, category, &context)
    }))
}

struct Candidate<'a> {
    index: usize,
    product: &'a ProductFactSheet,
    breakdown: ScoreBreakdown,
}

pub(crate) fn rank_with<F>(
    products: &[ProductFactSheet],
    category: &CategoryConfiguration,
    context: &ResolvedContext,
    mut evaluate: F,
) -> Ranking
where
    F: FnMut(&ProductFactSheet) -> Result<EvaluationResult, ProductError>,
{
    let mut candidates = Vec::new();
    let mut excluded = Vec::new();
    let mut failed = Vec::new();
    for (index, product) in products.iter().enumerate() {
        match evaluate(product) {
            Ok(EvaluationResult::Scored(breakdown)) => candidates.push(Candidate {
                index,
                product,
                breakdown,
            }),
            Ok(EvaluationResult::Disqualified(disqualification)) => excluded.push(ExcludedEntry {
                product_id: disqualification.product_id,
                fatal_reasons: disqualification.fatal_reasons,
            }),
            Err(error) => failed.push(FailedEntry {
                product_id: product.id.clone(),
                error,
            }),
        }
    }
    candidates.sort_by(ranking_order);
    let ranked: Vec<RankedEntry> = candidates
        .into_iter()
        .enumerate()
        .map(|(position, candidate)| RankedEntry {
            rank: position + 1,
            product_id: candidate.product.id.clone(),
            product_name: candidate.product.name.clone(),
            display_score: candidate.breakdown.display_score(),
            breakdown: candidate.breakdown,
        })
        .collect();
    debug!(
        "ranked {} products for `{}` under `{}`: {} ranked, {} excluded, {} failed",
        products.len(),
        category.category_id(),
        context.key(),
        ranked.len(),
        excluded.len(),
        failed.len(),
    );
    Ranking {
        category_id: category.category_id().to_owned(),
        contexts: context.active_contexts().ids().to_vec(),
        ranked,
        excluded,
        failed,
    }
}

fn ranking_order(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.breakdown
        .display_score()
        .total_cmp(&a.breakdown.display_score())
        .then_with(|| b.breakdown.score.total_cmp(&a.breakdown.score))
        .then_with(|| a.product.id.cmp(&b.product.id))
        .then_with(|| a.index.cmp(&b.index))
}

fn serialize_display<S>(error: &ProductError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(error)
}
