//! Hard and soft constraint evaluation.

use hmum_core::{CategoryConfiguration, ProductFactSheet};

use crate::context::ResolvedContext;
use crate::evaluation::{AppliedPenalty, FatalReason};

/// Every hard constraint that holds for `product`, in declaration order.
#[must_use]
pub fn hard_constraint_hits(
    product: &ProductFactSheet,
    category: &CategoryConfiguration,
    context: &ResolvedContext,
) -> Vec<FatalReason> {
    category
        .hard_constraints()
        .iter()
        .filter(|constraint| {
            constraint
                .predicate
                .matches(product, context.active_contexts())
        })
        .map(|constraint| FatalReason {
            constraint_id: constraint.id.clone(),
            reason: constraint.reason.clone(),
        })
        .collect()
}

/// Every active soft constraint that holds for `product`, in declaration
/// order.
#[must_use]
pub fn soft_constraint_penalties(
    product: &ProductFactSheet,
    category: &CategoryConfiguration,
    context: &ResolvedContext,
) -> Vec<AppliedPenalty> {
    category
        .soft_constraints()
        .iter()
        .filter(|constraint| context.is_soft_constraint_active(&constraint.id))
        .filter(|constraint| {
            constraint
                .predicate
                .matches(product, context.active_contexts())
        })
        .map(|constraint| AppliedPenalty {
            constraint_id: constraint.id.clone(),
            multiplier: constraint.penalty_multiplier,
            reason: constraint.reason.clone(),
        })
        .collect()
}
