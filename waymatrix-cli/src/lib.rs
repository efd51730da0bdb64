//! Command-line interface computing travel matrices between point layers.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod matrix;

pub use error::CliError;

use matrix::{MatrixArgs, run_matrix};

pub(crate) const ARG_SOURCE: &str = "source";
pub(crate) const ARG_SOURCE_FIELD: &str = "source-field";
pub(crate) const ARG_DESTINATION: &str = "destination";
pub(crate) const ARG_DESTINATION_FIELD: &str = "destination-field";
pub(crate) const ARG_PROFILE: &str = "profile";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_FORMAT: &str = "format";
pub(crate) const ARG_BASE_URL: &str = "base-url";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ENV_SOURCE: &str = "WAYMATRIX_CMDS_MATRIX_SOURCE";
pub(crate) const ENV_SOURCE_FIELD: &str = "WAYMATRIX_CMDS_MATRIX_SOURCE_FIELD";
pub(crate) const ENV_DESTINATION: &str = "WAYMATRIX_CMDS_MATRIX_DESTINATION";
pub(crate) const ENV_DESTINATION_FIELD: &str = "WAYMATRIX_CMDS_MATRIX_DESTINATION_FIELD";

/// Run the waymatrix CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Matrix(args) => run_matrix(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "waymatrix",
    about = "Travel time and distance matrices from an openrouteservice instance",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute durations and distances between two GeoJSON point layers.
    Matrix(MatrixArgs),
}

#[cfg(test)]
mod tests;
