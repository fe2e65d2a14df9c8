//! In-memory category source and small builders used by unit and behaviour
//! tests. Gated behind the `test-support` feature (and `cfg(test)`).

use std::collections::BTreeMap;

use crate::{
    AttributeDefinition, CategoryConfiguration, CategoryDefinition, CategorySource,
    ConfigurationError, Curve, DataField, Direction, FieldPath, MissingValueStrategy,
};

/// In-memory `CategorySource` keyed by category id.
#[derive(Debug, Default, Clone)]
pub struct MemoryCategorySource {
    categories: BTreeMap<String, CategoryConfiguration>,
}

impl MemoryCategorySource {
    /// Create a source holding the given categories.
    pub fn with_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = CategoryConfiguration>,
    {
        Self {
            categories: categories
                .into_iter()
                .map(|category| (category.category_id().to_owned(), category))
                .collect(),
        }
    }

    /// Add or replace a category.
    pub fn insert(&mut self, category: CategoryConfiguration) {
        self.categories
            .insert(category.category_id().to_owned(), category);
    }
}

impl CategorySource for MemoryCategorySource {
    fn load(&self, category_id: &str) -> Result<CategoryConfiguration, ConfigurationError> {
        self.categories
            .get(category_id)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownCategory {
                id: category_id.to_owned(),
            })
    }

    fn category_ids(&self) -> Result<Vec<String>, ConfigurationError> {
        Ok(self.categories.keys().cloned().collect())
    }
}

/// A maximize attribute reading the fact `id` through a `0..=10` linear
/// curve, imputing the neutral utility when missing.
///
/// # Panics
///
/// Panics if `id` is not a valid field path.
#[must_use]
pub fn attribute(id: &str, weight: f64) -> AttributeDefinition {
    AttributeDefinition {
        id: id.to_owned(),
        label: None,
        data_field: DataField::Fact(
            FieldPath::parse(id).expect("attribute id doubles as a field path"),
        ),
        weight,
        direction: Direction::Maximize,
        normalization: Curve::Linear {
            min: 0.0,
            max: 10.0,
        },
        missing_value_strategy: MissingValueStrategy::ImputeNeutral,
        impute_value: None,
    }
}

/// A valid two-attribute category `sample` with attributes `alpha` and
/// `beta`, equally weighted, and no constraints or contexts.
#[must_use]
pub fn category_definition() -> CategoryDefinition {
    CategoryDefinition {
        category_id: "sample".to_owned(),
        name: Some("Sample".to_owned()),
        aggregation: crate::AggregationMode::Geometric,
        attributes: vec![attribute("alpha", 1.0), attribute("beta", 1.0)],
        hard_constraints: Vec::new(),
        soft_constraints: Vec::new(),
        contexts: Vec::new(),
        mutually_exclusive: Vec::new(),
    }
}
