//! Single-product evaluation.

use hmum_core::{
    AttributeValueError, CategoryConfiguration, ContextSelection, ProductError, ProductFactSheet,
};

use crate::aggregate::{aggregate, apply_penalties, to_score};
use crate::constraints::{hard_constraint_hits, soft_constraint_penalties};
use crate::context::{ResolvedContext, resolve_context};
use crate::evaluation::{AttributeScore, Disqualification, EvaluationResult, ScoreBreakdown};
use crate::EvaluateError;

/// Evaluate one product under a context selection.
///
/// Hard constraints are checked first; a hit skips aggregation entirely and
/// yields [`EvaluationResult::Disqualified`].
///
/// # Errors
/// Returns [`EvaluateError::Context`] for an invalid selection and
/// [`EvaluateError::Product`] when a required value is missing or unusable.
///
/// # Examples
/// ```
/// use hmum_core::{CategoryConfiguration, ContextSelection, ProductFactSheet};
/// use hmum_scorer::evaluate;
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
///
/// let kettle = ProductFactSheet::new("k1").with_fact("capacity_l", 1.25);
/// let result = evaluate(&kettle, &category, &ContextSelection::general()).unwrap();
/// let score = result.score().unwrap();
/// assert!((score - 5.0).abs() < 1e-9);
/// ```
pub fn evaluate(
    product: &ProductFactSheet,
    category: &CategoryConfiguration,
    selection: &ContextSelection,
) -> Result<EvaluationResult, EvaluateError> {
    let context = resolve_context(category, selection)?;
    Ok(evaluate_resolved(product, category, &context)?)
}

/// Evaluate one product under an already resolved context.
///
/// Attributes whose effective weight is zero are outside the active criteria
/// set: they are neither read nor reported.
///
/// # Errors
/// Returns [`ProductError`] when a required value is missing or unusable.
pub fn evaluate_resolved(
    product: &ProductFactSheet,
    category: &CategoryConfiguration,
    context: &ResolvedContext,
) -> Result<EvaluationResult, ProductError> {
    let fatal_reasons = hard_constraint_hits(product, category, context);
    if !fatal_reasons.is_empty() {
        return Ok(EvaluationResult::Disqualified(Disqualification {
            product_id: product.id.clone(),
            fatal_reasons,
        }));
    }

    let mut attributes = Vec::new();
    for (attribute, &weight) in category.attributes().iter().zip(context.weights()) {
        if weight <= 0.0 {
            continue;
        }
        let scored = attribute
            .utility_for(product)
            .map_err(|err| match err {
                AttributeValueError::Missing => ProductError::MissingRequiredAttribute {
                    product: product.id.clone(),
                    attribute: attribute.id.clone(),
                },
                AttributeValueError::Invalid(source) => ProductError::InvalidAttributeValue {
                    product: product.id.clone(),
                    attribute: attribute.id.clone(),
                    source,
                },
            })?;
        attributes.push(AttributeScore {
            attribute_id: attribute.id.clone(),
            utility: scored.utility,
            weight,
            source: scored.source,
        });
    }

    let utilities: Vec<f64> = attributes.iter().map(|a| a.utility).collect();
    let weights: Vec<f64> = attributes.iter().map(|a| a.weight).collect();
    let base_aggregate = aggregate(category.aggregation(), &utilities, &weights);
    let applied_penalties = soft_constraint_penalties(product, category, context);
    let utility = apply_penalties(
        base_aggregate,
        applied_penalties.iter().map(|penalty| penalty.multiplier),
    );

    Ok(EvaluationResult::Scored(ScoreBreakdown {
        product_id: product.id.clone(),
        score: to_score(utility),
        utility,
        base_aggregate,
        aggregation: category.aggregation(),
        attributes,
        applied_penalties,
    }))
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "tests compare floating-point results with tolerances"
)]
mod tests {
    use super::*;
    use hmum_core::ValueSource;
    use hmum_core::test_support::{attribute, category_definition};
    use rstest::rstest;

    fn sample() -> CategoryConfiguration {
        CategoryConfiguration::try_from(category_definition()).expect("valid category")
    }

    #[rstest]
    fn scores_product_with_breakdown() {
        let product = ProductFactSheet::new("p")
            .with_fact("alpha", 8.0)
            .with_fact("beta", 2.0);
        let result =
            evaluate(&product, &sample(), &ContextSelection::general()).expect("evaluation");
        let breakdown = result.breakdown().expect("scored");
        assert!((breakdown.score - 4.0).abs() < 1e-9);
        assert_eq!(breakdown.display_score(), 4.0);
        assert_eq!(breakdown.attributes.len(), 2);
        assert!(breakdown.applied_penalties.is_empty());
    }

    #[rstest]
    fn missing_neutral_value_is_marked_imputed() {
        let product = ProductFactSheet::new("p").with_fact("alpha", 5.0);
        let result =
            evaluate(&product, &sample(), &ContextSelection::general()).expect("evaluation");
        let breakdown = result.breakdown().expect("scored");
        let sources: Vec<_> = breakdown.attributes.iter().map(|a| a.source).collect();
        assert_eq!(sources, vec![ValueSource::Observed, ValueSource::ImputedNeutral]);
    }

    #[rstest]
    fn zero_weight_attributes_are_skipped() {
        let mut definition = category_definition();
        definition.attributes.push(attribute("gamma", 0.0));
        definition.attributes[2].missing_value_strategy = hmum_core::MissingValueStrategy::Fail;
        let category = CategoryConfiguration::try_from(definition).expect("valid category");
        let product = ProductFactSheet::new("p")
            .with_fact("alpha", 5.0)
            .with_fact("beta", 5.0);
        let result =
            evaluate(&product, &category, &ContextSelection::general()).expect("evaluation");
        assert_eq!(result.breakdown().map(|b| b.attributes.len()), Some(2));
    }

    #[rstest]
    fn huge_weights_keep_every_attribute_in_the_aggregate() {
        let mut definition = category_definition();
        definition.attributes = vec![attribute("alpha", 1e308), attribute("beta", 1e308)];
        let category = CategoryConfiguration::try_from(definition).expect("valid category");
        let product = ProductFactSheet::new("p")
            .with_fact("alpha", 0.0)
            .with_fact("beta", 0.0);
        let result =
            evaluate(&product, &category, &ContextSelection::general()).expect("evaluation");
        let breakdown = result.breakdown().expect("scored");
        assert_eq!(breakdown.attributes.len(), 2);
        assert!(breakdown.score < 0.01, "score {} should sit at the floor", breakdown.score);
    }

    #[rstest]
    fn unknown_context_fails_evaluation() {
        let product = ProductFactSheet::new("p");
        let err = evaluate(&product, &sample(), &ContextSelection::single("gaming"))
            .expect_err("unknown context");
        assert!(matches!(err, EvaluateError::Context(_)));
    }

    #[rstest]
    fn invalid_value_names_product_and_attribute() {
        let product = ProductFactSheet::new("p")
            .with_fact("alpha", "bright")
            .with_fact("beta", 1.0);
        let err = evaluate(&product, &sample(), &ContextSelection::general())
            .expect_err("invalid value");
        let EvaluateError::Product(product_error) = err else {
            panic!("expected product error, got {err:?}");
        };
        assert_eq!(product_error.product_id(), "p");
        assert_eq!(product_error.attribute_id(), "alpha");
    }
}
