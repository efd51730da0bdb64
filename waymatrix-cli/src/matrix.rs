//! Matrix command implementation for the waymatrix CLI.

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waymatrix_core::{
    LayerId, LogFeedback, MatrixAlgorithm, MatrixClient, MatrixParameters, MatrixSummary, Profile,
};
use waymatrix_data::{CsvSink, GeoJsonLayer, JsonSink, OrsClientConfig, OrsMatrixClient};

use crate::{
    ARG_BASE_URL, ARG_DESTINATION, ARG_DESTINATION_FIELD, ARG_FORMAT, ARG_OUTPUT, ARG_PROFILE,
    ARG_SOURCE, ARG_SOURCE_FIELD, ARG_TIMEOUT_SECS, CliError, ENV_DESTINATION,
    ENV_DESTINATION_FIELD, ENV_SOURCE, ENV_SOURCE_FIELD,
};

/// CLI arguments for the `matrix` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compute the travel duration and distance between every \
                 source point and every destination point by querying an \
                 openrouteservice matrix endpoint. Layers are GeoJSON \
                 FeatureCollections of points; passing the same path twice \
                 computes the matrix of a layer against itself.",
    about = "Compute a travel matrix between two point layers"
)]
#[ortho_config(prefix = "WAYMATRIX")]
pub(crate) struct MatrixArgs {
    /// Path to the GeoJSON layer of origins.
    #[arg(long = ARG_SOURCE, value_name = "path")]
    #[serde(default)]
    pub(crate) source: Option<Utf8PathBuf>,
    /// Property identifying each origin.
    #[arg(long = ARG_SOURCE_FIELD, value_name = "name")]
    #[serde(default)]
    pub(crate) source_field: Option<String>,
    /// Path to the GeoJSON layer of destinations.
    #[arg(long = ARG_DESTINATION, value_name = "path")]
    #[serde(default)]
    pub(crate) destination: Option<Utf8PathBuf>,
    /// Property identifying each destination.
    #[arg(long = ARG_DESTINATION_FIELD, value_name = "name")]
    #[serde(default)]
    pub(crate) destination_field: Option<String>,
    /// Travel profile, e.g. "driving-car" or "foot-walking".
    #[arg(long = ARG_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) profile: Option<String>,
    /// Write the table to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Output format: "csv" (default) or "json".
    #[arg(long = ARG_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<String>,
    /// Root URL of the openrouteservice instance.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl MatrixArgs {
    pub(crate) fn into_config(self) -> Result<MatrixConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MatrixConfig::try_from(merged)
    }
}

/// Table encoding written by the command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(CliError::InvalidFormat {
                value: s.to_owned(),
            }),
        }
    }
}

/// Resolved `matrix` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatrixConfig {
    pub(crate) source: Utf8PathBuf,
    pub(crate) source_field: String,
    pub(crate) destination: Utf8PathBuf,
    pub(crate) destination_field: String,
    pub(crate) profile: Profile,
    /// `None` writes to stdout.
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) format: OutputFormat,
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

impl MatrixConfig {
    /// Return `true` when both options name the same layer file.
    pub(crate) fn is_self_matrix(&self) -> bool {
        self.source == self.destination
    }

    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.source, ARG_SOURCE)?;
        Self::require_existing(&self.destination, ARG_DESTINATION)?;
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match waymatrix_fs::file_is_file(path) {
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
}

impl TryFrom<MatrixArgs> for MatrixConfig {
    type Error = CliError;

    fn try_from(args: MatrixArgs) -> Result<Self, Self::Error> {
        let source = args.source.ok_or(CliError::MissingArgument {
            field: ARG_SOURCE,
            env: ENV_SOURCE,
        })?;
        let source_field = args.source_field.ok_or(CliError::MissingArgument {
            field: ARG_SOURCE_FIELD,
            env: ENV_SOURCE_FIELD,
        })?;
        let destination = args.destination.ok_or(CliError::MissingArgument {
            field: ARG_DESTINATION,
            env: ENV_DESTINATION,
        })?;
        let destination_field = args.destination_field.ok_or(CliError::MissingArgument {
            field: ARG_DESTINATION_FIELD,
            env: ENV_DESTINATION_FIELD,
        })?;

        let profile = args
            .profile
            .as_deref()
            .map(Profile::from_str)
            .transpose()?
            .unwrap_or_default();
        let format = args
            .format
            .as_deref()
            .map(OutputFormat::from_str)
            .transpose()?
            .unwrap_or_default();

        let defaults = OrsClientConfig::default();
        let base_url = args.base_url.unwrap_or(defaults.base_url);
        let timeout = args
            .timeout_secs
            .map_or(defaults.timeout, Duration::from_secs);

        Ok(Self {
            source,
            source_field,
            destination,
            destination_field,
            profile,
            output: args.output,
            format,
            base_url,
            timeout,
        })
    }
}

/// Builds the routing client for the current matrix invocation.
pub(super) trait MatrixClientBuilder {
    fn build(&self, config: &MatrixConfig) -> Result<Box<dyn MatrixClient>, CliError>;
}

pub(super) struct DefaultMatrixClientBuilder;

impl MatrixClientBuilder for DefaultMatrixClientBuilder {
    fn build(&self, config: &MatrixConfig) -> Result<Box<dyn MatrixClient>, CliError> {
        let client_config =
            OrsClientConfig::new(config.base_url.clone()).with_timeout(config.timeout);
        let client = OrsMatrixClient::with_config(client_config).map_err(|source| {
            CliError::BuildClient {
                base_url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(client))
    }
}

pub(super) fn run_matrix(args: MatrixArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultMatrixClientBuilder;
    run_matrix_with(args, &builder, &mut stdout)
}

/// Resolve `args`, run the matrix and write the table.
///
/// Nothing is written unless the invocation succeeds.
pub(super) fn run_matrix_with(
    args: MatrixArgs,
    builder: &dyn MatrixClientBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_matrix_config(args)?;
    let (summary, table) = execute_matrix(&config, builder)?;
    info!(
        "matrix of {} rows computed over {} locations",
        summary.rows, summary.locations
    );
    write_table(config.output.as_deref(), writer, &table)
}

fn resolve_matrix_config(args: MatrixArgs) -> Result<MatrixConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_matrix(
    config: &MatrixConfig,
    builder: &dyn MatrixClientBuilder,
) -> Result<(MatrixSummary, Vec<u8>), CliError> {
    let source = load_layer(&config.source, ARG_SOURCE)?;
    let distinct_destination = if config.is_self_matrix() {
        None
    } else {
        Some(load_layer(&config.destination, ARG_DESTINATION)?)
    };
    let destination = distinct_destination.as_ref().unwrap_or(&source);

    let algorithm = MatrixAlgorithm::new(builder.build(config)?);
    let params = MatrixParameters::new(
        &source,
        &config.source_field,
        destination,
        &config.destination_field,
        config.profile,
    );
    let feedback = LogFeedback::default();

    let mut table = Vec::new();
    let summary = match config.format {
        OutputFormat::Csv => {
            let mut sink = CsvSink::new(&mut table);
            algorithm.run(&params, &mut sink, &feedback)?
        }
        OutputFormat::Json => {
            let mut sink = JsonSink::new(&mut table);
            algorithm.run(&params, &mut sink, &feedback)?
        }
    };
    Ok((summary, table))
}

/// Load the GeoJSON layer at `path`, identified by the path as given.
pub(super) fn load_layer(path: &Utf8Path, field: &'static str) -> Result<GeoJsonLayer, CliError> {
    GeoJsonLayer::from_path(LayerId::new(path.as_str()), path).map_err(|source| {
        CliError::LoadLayer {
            field,
            source: Box::new(source),
        }
    })
}

fn write_table(
    output: Option<&Utf8Path>,
    writer: &mut dyn Write,
    table: &[u8],
) -> Result<(), CliError> {
    match output {
        Some(path) => waymatrix_fs::write_file(path, table).map_err(CliError::WriteOutput),
        None => {
            writer.write_all(table).map_err(CliError::WriteOutput)?;
            writer.flush().map_err(CliError::WriteOutput)
        }
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<MatrixConfig, CliError> {
    let merged = MatrixArgs::merge_from_layers(layers).map_err(CliError::from)?;
    MatrixConfig::try_from(merged)
}
