//! Access to category configurations.
//!
//! The `CategorySource` trait defines a read-only interface for resolving a
//! category id to a validated [`CategoryConfiguration`]. Callers load once
//! and share the result; the scorer never touches storage.

use crate::{CategoryConfiguration, ConfigurationError};

#[cfg(feature = "source-fs")]
mod directory;

#[cfg(feature = "source-fs")]
pub use directory::{CONFIG_EXTENSION, DirectoryCategorySource, load_category_configuration};

/// Read-only access to category configurations.
///
/// # Examples
///
/// ```rust
/// use hmum_core::{CategoryConfiguration, CategorySource, ConfigurationError};
///
/// struct Inline(&'static str);
///
/// impl CategorySource for Inline {
///     fn load(&self, category_id: &str) -> Result<CategoryConfiguration, ConfigurationError> {
///         let category = CategoryConfiguration::from_json_str(self.0)?;
///         if category.category_id() != category_id {
///             return Err(ConfigurationError::UnknownCategory { id: category_id.into() });
///         }
///         Ok(category)
///     }
///
///     fn category_ids(&self) -> Result<Vec<String>, ConfigurationError> {
///         Ok(vec!["kettles".into()])
///     }
/// }
///
/// let source = Inline(r#"{
///     "category_id": "kettles",
///     "attributes": [{
///         "id": "capacity",
///         "data_field": { "fact": "capacity_l" },
///         "weight": 1.0,
///         "normalization": { "kind": "linear", "min": 0.5, "max": 2.0 },
///         "missing_value_strategy": "fail"
///     }]
/// }"#);
/// assert_eq!(source.load("kettles").unwrap().category_id(), "kettles");
/// assert!(source.load("toasters").is_err());
/// ```
pub trait CategorySource {
    /// Load and validate the configuration for `category_id`.
    fn load(&self, category_id: &str) -> Result<CategoryConfiguration, ConfigurationError>;

    /// Ids of every category the source can load, sorted.
    fn category_ids(&self) -> Result<Vec<String>, ConfigurationError>;

    /// Load every category, failing on the first invalid one.
    fn load_all(&self) -> Result<Vec<CategoryConfiguration>, ConfigurationError> {
        self.category_ids()?
            .iter()
            .map(|id| self.load(id))
            .collect()
    }
}
