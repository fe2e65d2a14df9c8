//! Validate command implementation for the HMUM CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use hmum_core::{CategoryConfiguration, CategorySource, DirectoryCategorySource};
use log::warn;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_CONFIG_DIR, CliError, ENV_VALIDATE_CONFIG_DIR, write_json};

/// CLI arguments for the `validate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Check every category configuration in a directory")]
#[ortho_config(prefix = "HMUM")]
pub(crate) struct ValidateArgs {
    /// Directory holding `<category_id>.json` configuration files.
    #[arg(long = ARG_CONFIG_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) config_dir: Option<Utf8PathBuf>,
}

/// Outcome of validating one category file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum CategoryReport {
    Valid {
        category_id: String,
        name: String,
        attributes: usize,
        contexts: Vec<String>,
    },
    Invalid {
        category_id: String,
        error: String,
    },
}

impl CategoryReport {
    fn valid(category: &CategoryConfiguration) -> Self {
        Self::Valid {
            category_id: category.category_id().to_owned(),
            name: category.name().to_owned(),
            attributes: category.attributes().len(),
            contexts: category
                .contexts()
                .iter()
                .map(|context| context.id.clone())
                .collect(),
        }
    }

    const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}

pub(crate) fn run_validate(args: ValidateArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config_dir = merged.config_dir.ok_or(CliError::MissingArgument {
        field: ARG_CONFIG_DIR,
        env: ENV_VALIDATE_CONFIG_DIR,
    })?;
    validate_directory(DirectoryCategorySource::new(config_dir), writer)
}

/// Validate every category `source` lists, reporting each one.
pub(crate) fn validate_directory(
    source: DirectoryCategorySource,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let reports: Vec<CategoryReport> = source
        .category_ids()?
        .into_iter()
        .map(|id| match source.load(&id) {
            Ok(category) => CategoryReport::valid(&category),
            Err(err) => {
                warn!("category `{id}` is invalid: {}", error_chain(&err));
                CategoryReport::Invalid {
                    category_id: id,
                    error: error_chain(&err),
                }
            }
        })
        .collect();
    write_json(writer, &reports)?;

    let count = reports.iter().filter(|report| report.is_invalid()).count();
    if count == 0 {
        Ok(())
    } else {
        Err(CliError::InvalidCategories { count })
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
