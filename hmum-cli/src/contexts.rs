//! Contexts command implementation for the HMUM CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use hmum_core::{CategorySource, DirectoryCategorySource};
use hmum_scorer::list_available_contexts;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CATEGORY, ARG_CONFIG_DIR, CliError, ENV_CONTEXTS_CATEGORY, ENV_CONTEXTS_CONFIG_DIR,
    write_json,
};

/// CLI arguments for the `contexts` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List the usage contexts a category declares")]
#[ortho_config(prefix = "HMUM")]
pub(crate) struct ContextsArgs {
    /// Directory holding `<category_id>.json` configuration files.
    #[arg(long = ARG_CONFIG_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) config_dir: Option<Utf8PathBuf>,
    /// Category whose contexts to list.
    #[arg(long = ARG_CATEGORY, value_name = "id")]
    #[serde(default)]
    pub(crate) category: Option<String>,
}

/// One row of the context listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ContextSummary<'a> {
    id: &'a str,
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    exclusive_with: Vec<&'a str>,
}

pub(crate) fn run_contexts(args: ContextsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config_dir = merged.config_dir.ok_or(CliError::MissingArgument {
        field: ARG_CONFIG_DIR,
        env: ENV_CONTEXTS_CONFIG_DIR,
    })?;
    let category_id = merged.category.ok_or(CliError::MissingArgument {
        field: ARG_CATEGORY,
        env: ENV_CONTEXTS_CATEGORY,
    })?;
    let category = DirectoryCategorySource::new(config_dir).load(&category_id)?;

    let summaries: Vec<ContextSummary<'_>> = list_available_contexts(&category)
        .iter()
        .map(|context| ContextSummary {
            id: &context.id,
            label: &context.label,
            description: context.description.as_deref(),
            exclusive_with: category
                .mutually_exclusive()
                .iter()
                .filter_map(|[first, second]| {
                    if *first == context.id {
                        Some(second.as_str())
                    } else if *second == context.id {
                        Some(first.as_str())
                    } else {
                        None
                    }
                })
                .collect(),
        })
        .collect();
    write_json(writer, &summaries)
}
