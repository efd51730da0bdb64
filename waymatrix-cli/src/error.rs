//! Error types emitted by the waymatrix CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use waymatrix_core::{MatrixError, UnknownProfile};
use waymatrix_data::{ClientBuildError, LayerLoadError};

/// Errors emitted by the waymatrix CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The travel profile is not one the routing service knows.
    #[error(transparent)]
    InvalidProfile(#[from] UnknownProfile),
    /// The output format is neither CSV nor JSON.
    #[error("unknown output format '{value}' (expected csv or json)")]
    InvalidFormat { value: String },
    /// Reading a GeoJSON layer failed.
    #[error("failed to load {field} layer: {source}")]
    LoadLayer {
        field: &'static str,
        #[source]
        source: Box<LayerLoadError>,
    },
    /// Constructing the routing client failed.
    #[error("failed to build routing client for {base_url:?}: {source}")]
    BuildClient {
        base_url: String,
        #[source]
        source: ClientBuildError,
    },
    /// The matrix invocation failed.
    #[error("matrix failed: {0}")]
    Matrix(#[source] Box<MatrixError>),
    /// Writing the rendered table failed.
    #[error("failed to write matrix output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl From<MatrixError> for CliError {
    fn from(err: MatrixError) -> Self {
        Self::Matrix(Box::new(err))
    }
}
