//! Error types emitted by the SafeRoute CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use saferoute_core::{GeometryDecodeError, LocationParseError, PlanError};
use saferoute_data::{ParseTravelModeError, ProviderBuildError};
use saferoute_model::ModelError;
use thiserror::Error;

/// Errors emitted by the SafeRoute CLI.
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
    /// Two mutually exclusive options were both supplied.
    #[error("--{first} cannot be combined with --{second}")]
    ConflictingArguments {
        first: &'static str,
        second: &'static str,
    },
    /// A trip endpoint could not be parsed.
    #[error("invalid {field}: {source}")]
    InvalidLocation {
        field: &'static str,
        #[source]
        source: LocationParseError,
    },
    /// The assessment mode is not recognised.
    #[error("unknown mode {value:?}; expected crime or combined")]
    InvalidMode { value: String },
    /// The travel mode is not recognised.
    #[error(transparent)]
    InvalidTravelMode(#[from] ParseTravelModeError),
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist or is not a file")]
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
    /// Loading the cluster model or risk table failed.
    #[error(transparent)]
    LoadModel(#[from] ModelError),
    /// Constructing an HTTP adapter failed.
    #[error("failed to build {service} client for {url:?}: {source}")]
    BuildProvider {
        service: &'static str,
        url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Planning the trip failed.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// The supplied polyline could not be decoded.
    #[error("invalid polyline: {0}")]
    Geometry(#[from] GeometryDecodeError),
    /// Serializing the command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
