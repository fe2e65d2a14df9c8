//! Rank command implementation for the HMUM CLI.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use hmum_core::{CategorySource, ContextSelection, DirectoryCategorySource, ProductFactSheet};
use hmum_fs::open_utf8_file;
use hmum_scorer::{Ranking, rank_products};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CATEGORY, ARG_CONFIG_DIR, ARG_CONTEXT, ARG_OUTPUT, ARG_PRODUCTS, CliError,
    ENV_RANK_CATEGORY, ENV_RANK_CONFIG_DIR, ENV_RANK_PRODUCTS, require_existing_file, write_json,
};

/// CLI arguments for the `rank` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Score every product in a JSON catalogue under one category \
                 and rank them. Pass --context once per usage context; \
                 contexts apply in the order the category declares them.",
    about = "Rank a product catalogue"
)]
#[ortho_config(prefix = "HMUM")]
pub(crate) struct RankArgs {
    /// Path to a JSON array of product fact sheets.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) products_path: Option<Utf8PathBuf>,
    /// Directory holding `<category_id>.json` configuration files.
    #[arg(long = ARG_CONFIG_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) config_dir: Option<Utf8PathBuf>,
    /// Category to rank the catalogue under.
    #[arg(long = ARG_CATEGORY, value_name = "id")]
    #[serde(default)]
    pub(crate) category: Option<String>,
    /// Usage context to activate; repeat for several.
    #[arg(long = ARG_CONTEXT, value_name = "id")]
    #[serde(default)]
    pub(crate) contexts: Vec<String>,
    /// Write the ranking to this file instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl RankArgs {
    pub(crate) fn into_config(self) -> Result<RankConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RankConfig::try_from(merged)
    }
}

/// Resolved `rank` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RankConfig {
    pub(crate) products_path: Utf8PathBuf,
    pub(crate) config_dir: Utf8PathBuf,
    pub(crate) category: String,
    pub(crate) contexts: ContextSelection,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<RankArgs> for RankConfig {
    type Error = CliError;

    fn try_from(args: RankArgs) -> Result<Self, Self::Error> {
        let products_path = args.products_path.ok_or(CliError::MissingArgument {
            field: ARG_PRODUCTS,
            env: ENV_RANK_PRODUCTS,
        })?;
        let config_dir = args.config_dir.ok_or(CliError::MissingArgument {
            field: ARG_CONFIG_DIR,
            env: ENV_RANK_CONFIG_DIR,
        })?;
        let category = args.category.ok_or(CliError::MissingArgument {
            field: ARG_CATEGORY,
            env: ENV_RANK_CATEGORY,
        })?;
        Ok(Self {
            products_path,
            config_dir,
            category,
            contexts: ContextSelection::from_ids(args.contexts),
            output: args.output,
        })
    }
}

pub(crate) fn run_rank(args: RankArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_rank_with_config(&config, writer)
}

pub(crate) fn run_rank_with_config(
    config: &RankConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let ranking = execute_rank(config)?;
    match &config.output {
        Some(path) => write_ranking_file(path, &ranking),
        None => write_json(writer, &ranking),
    }
}

fn execute_rank(config: &RankConfig) -> Result<Ranking, CliError> {
    require_existing_file(&config.products_path, ARG_PRODUCTS)?;
    let category = DirectoryCategorySource::new(config.config_dir.clone()).load(&config.category)?;
    let products = load_products(&config.products_path)?;
    let ranking = rank_products(&products, &category, &config.contexts)?;
    info!(
        "ranked {} product(s) under `{}`: {} scored, {} excluded, {} failed",
        products.len(),
        ranking.category_id,
        ranking.ranked.len(),
        ranking.excluded.len(),
        ranking.failed.len()
    );
    Ok(ranking)
}

/// Load a JSON array of [`ProductFactSheet`]s from disk.
pub(crate) fn load_products(path: &Utf8Path) -> Result<Vec<ProductFactSheet>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenProducts {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseProducts {
        path: path.to_path_buf(),
        source,
    })
}

fn write_ranking_file(path: &Utf8Path, ranking: &Ranking) -> Result<(), CliError> {
    let mut payload = serde_json::to_vec_pretty(ranking).map_err(CliError::SerialiseOutput)?;
    payload.push(b'\n');
    hmum_fs::write_utf8_file(path, &payload).map_err(|source| CliError::WriteOutputFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RankConfig, CliError> {
    let merged = RankArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RankConfig::try_from(merged)
}
