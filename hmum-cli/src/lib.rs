//! Command-line interface for ranking products against HMUM category
//! configurations.
//!
//! Three subcommands are provided:
//!
//! - `rank` scores a JSON product catalogue under a category and optional
//!   contexts, printing the ranking as JSON.
//! - `validate` loads every category in a configuration directory and
//!   reports which ones are usable.
//! - `contexts` lists the usage contexts a category declares.
//!
//! Every option may also come from a configuration file or from `HMUM_*`
//! environment variables, layered by `ortho_config`.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};

mod contexts;
mod error;
mod rank;
mod validate;

pub use error::CliError;

use contexts::ContextsArgs;
use rank::RankArgs;
use validate::ValidateArgs;

pub(crate) const ARG_CONFIG_DIR: &str = "config-dir";
pub(crate) const ARG_CATEGORY: &str = "category";
pub(crate) const ARG_CONTEXT: &str = "context";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_PRODUCTS: &str = "products";
pub(crate) const ENV_RANK_CONFIG_DIR: &str = "HMUM_CMDS_RANK_CONFIG_DIR";
pub(crate) const ENV_RANK_CATEGORY: &str = "HMUM_CMDS_RANK_CATEGORY";
pub(crate) const ENV_RANK_PRODUCTS: &str = "HMUM_CMDS_RANK_PRODUCTS_PATH";
pub(crate) const ENV_VALIDATE_CONFIG_DIR: &str = "HMUM_CMDS_VALIDATE_CONFIG_DIR";
pub(crate) const ENV_CONTEXTS_CONFIG_DIR: &str = "HMUM_CMDS_CONTEXTS_CONFIG_DIR";
pub(crate) const ENV_CONTEXTS_CATEGORY: &str = "HMUM_CMDS_CONTEXTS_CATEGORY";

/// Run the HMUM CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments are invalid, inputs cannot be read,
/// or the engine rejects the request.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &mut stdout)
}

fn run_command(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Rank(args) => rank::run_rank(args, writer),
        Command::Validate(args) => validate::run_validate(args, writer),
        Command::Contexts(args) => contexts::run_contexts(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "hmum",
    about = "Contextual multi-criteria product scoring",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank a product catalogue under a category and usage contexts.
    Rank(RankArgs),
    /// Check every category configuration in a directory.
    Validate(ValidateArgs),
    /// List the usage contexts a category declares.
    Contexts(ContextsArgs),
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: serde::Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

/// Require `path` to name an existing regular file.
pub(crate) fn require_existing_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match hmum_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
