//! Directory-backed category source: one `<category_id>.json` per category.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use super::CategorySource;
use crate::category::validate_category_id;
use crate::{CategoryConfiguration, CategoryDefinition, ConfigurationError};

/// File extension of category configuration files.
pub const CONFIG_EXTENSION: &str = "json";

/// Loads category configurations from a directory of JSON files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCategorySource {
    root: Utf8PathBuf,
}

impl DirectoryCategorySource {
    /// Create a source rooted at `root`. The directory is not touched until
    /// a category is loaded.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the configuration files.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of the file backing `category_id`.
    #[must_use]
    pub fn path_for(&self, category_id: &str) -> Utf8PathBuf {
        self.root.join(format!("{category_id}.{CONFIG_EXTENSION}"))
    }
}

impl CategorySource for DirectoryCategorySource {
    fn load(&self, category_id: &str) -> Result<CategoryConfiguration, ConfigurationError> {
        validate_category_id(category_id)?;
        let path = self.path_for(category_id);
        match hmum_fs::file_is_file(&path) {
            Ok(true) => {}
            Ok(false) => {
                return Err(ConfigurationError::UnknownCategory {
                    id: category_id.to_owned(),
                });
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigurationError::UnknownCategory {
                    id: category_id.to_owned(),
                });
            }
            Err(source) => return Err(ConfigurationError::ReadFile { path, source }),
        }
        let contents =
            hmum_fs::read_utf8_to_string(&path).map_err(|source| ConfigurationError::ReadFile {
                path: path.clone(),
                source,
            })?;
        let definition: CategoryDefinition =
            serde_json::from_str(&contents).map_err(|source| ConfigurationError::ParseFile {
                path: path.clone(),
                source,
            })?;
        if definition.category_id != category_id {
            return Err(ConfigurationError::CategoryIdMismatch {
                expected: category_id.to_owned(),
                found: definition.category_id,
            });
        }
        let category =
            CategoryConfiguration::try_from(definition).map_err(|source| {
                ConfigurationError::InvalidFile {
                    path: path.clone(),
                    source: Box::new(source),
                }
            })?;
        debug!("loaded category `{category_id}` from {path}");
        Ok(category)
    }

    fn category_ids(&self) -> Result<Vec<String>, ConfigurationError> {
        let files = hmum_fs::list_files_with_extension(&self.root, CONFIG_EXTENSION).map_err(
            |source| ConfigurationError::ListDirectory {
                path: self.root.clone(),
                source,
            },
        )?;
        Ok(files
            .iter()
            .filter_map(|path| path.file_stem())
            .map(str::to_owned)
            .collect())
    }
}

/// Load and validate `<dir>/<category_id>.json`.
///
/// # Examples
///
/// ```rust,no_run
/// use camino::Utf8Path;
/// use hmum_core::load_category_configuration;
///
/// let category = load_category_configuration(Utf8Path::new("config/categories"), "tv")?;
/// println!("{} has {} attributes", category.name(), category.attributes().len());
/// # Ok::<(), hmum_core::ConfigurationError>(())
/// ```
pub fn load_category_configuration(
    dir: &Utf8Path,
    category_id: &str,
) -> Result<CategoryConfiguration, ConfigurationError> {
    DirectoryCategorySource::new(dir).load(category_id)
}
