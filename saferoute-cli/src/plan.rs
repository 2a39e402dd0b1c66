//! Plan command implementation for the SafeRoute CLI.

use std::io::Write;
use std::str::FromStr;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use saferoute_core::Location;
use serde::{Deserialize, Serialize};

use saferoute_model::ArtefactPaths;

use crate::services::{
    ArtefactOptions, CollaboratorBuilder, HttpCollaboratorBuilder, ServiceConfig, ServiceOptions,
    open_session, write_json,
};
use crate::{
    ARG_ARTEFACTS_DIR, ARG_CLUSTERS, ARG_DETECTOR_URL, ARG_FROM, ARG_GOOGLE_API_KEY,
    ARG_GOOGLE_BASE_URL, ARG_MODE, ARG_RISK_TABLE, ARG_TO, ARG_TRAVEL_MODE, CliError,
    ENV_PLAN_FROM, ENV_PLAN_GOOGLE_API_KEY, ENV_PLAN_TO,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Resolve both trip endpoints, fetch alternative routes from \
                 Google Maps and score them against the prepared crime model \
                 (clusters.json, risk_table.json). In combined mode every \
                 route is also probed for street lighting through Street View \
                 imagery and the lamp detector.",
    about = "Plan a trip and rank its alternative routes"
)]
#[ortho_config(prefix = "SAFEROUTE")]
pub(crate) struct PlanArgs {
    /// Trip origin as an address or "lat,lng".
    #[arg(long = ARG_FROM, value_name = "location")]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Trip destination as an address or "lat,lng".
    #[arg(long = ARG_TO, value_name = "location")]
    #[serde(default)]
    pub(crate) to: Option<String>,
    /// Assessment mode: "crime" (default) or "combined".
    #[arg(long = ARG_MODE, value_name = "mode")]
    #[serde(default)]
    pub(crate) mode: Option<String>,
    /// Directory containing the default artefact filenames.
    #[arg(long = ARG_ARTEFACTS_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) artefacts_dir: Option<Utf8PathBuf>,
    /// Override the path to the cluster centroids (`clusters.json`).
    #[arg(long = ARG_CLUSTERS, value_name = "path")]
    #[serde(default)]
    pub(crate) clusters: Option<Utf8PathBuf>,
    /// Override the path to the cluster risk table (`risk_table.json`).
    #[arg(long = ARG_RISK_TABLE, value_name = "path")]
    #[serde(default)]
    pub(crate) risk_table: Option<Utf8PathBuf>,
    /// Google Maps Platform API key.
    #[arg(long = ARG_GOOGLE_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) google_api_key: Option<String>,
    /// Base URL for the Google Maps APIs.
    #[arg(long = ARG_GOOGLE_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) google_base_url: Option<String>,
    /// Travel mode for directions: driving, walking, bicycling or transit.
    #[arg(long = ARG_TRAVEL_MODE, value_name = "mode")]
    #[serde(default)]
    pub(crate) travel_mode: Option<String>,
    /// Full URL of the lamp detection endpoint.
    #[arg(long = ARG_DETECTOR_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) detector_url: Option<String>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// How candidate routes are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum AssessmentMode {
    /// Crime risk alone.
    #[default]
    Crime,
    /// Crime risk blended with street lighting.
    Combined,
}

impl FromStr for AssessmentMode {
    type Err = CliError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "crime" => Ok(Self::Crime),
            "combined" => Ok(Self::Combined),
            _ => Err(CliError::InvalidMode {
                value: value.to_owned(),
            }),
        }
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct PlanConfig {
    pub(crate) origin: Location,
    pub(crate) destination: Location,
    pub(crate) mode: AssessmentMode,
    pub(crate) artefacts: ArtefactPaths,
    pub(crate) services: ServiceConfig,
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let origin = parse_location(args.from, ARG_FROM, ENV_PLAN_FROM)?;
        let destination = parse_location(args.to, ARG_TO, ENV_PLAN_TO)?;
        let mode: AssessmentMode = args
            .mode
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or_default();
        let services = ServiceOptions {
            google_api_key: args.google_api_key,
            google_base_url: args.google_base_url,
            travel_mode: args.travel_mode,
            detector_url: args.detector_url,
        }
        .resolve(ENV_PLAN_GOOGLE_API_KEY)?;
        let artefacts = ArtefactOptions {
            artefacts_dir: args.artefacts_dir,
            clusters: args.clusters,
            risk_table: args.risk_table,
        }
        .resolve();

        Ok(Self {
            origin,
            destination,
            mode,
            artefacts,
            services,
        })
    }
}

/// Parse a required trip endpoint.
pub(crate) fn parse_location(
    value: Option<String>,
    field: &'static str,
    env: &'static str,
) -> Result<Location, CliError> {
    let raw = value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or(CliError::MissingArgument { field, env })?;
    raw.parse()
        .map_err(|source| CliError::InvalidLocation { field, source })
}

pub(super) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &HttpCollaboratorBuilder, &mut stdout)
}

pub(super) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn CollaboratorBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let session = open_session(&config.artefacts, &config.services, builder)?;
    log::info!(
        "planning {} trip with {:?} scoring",
        config.services.google.travel_mode,
        config.mode
    );
    match config.mode {
        AssessmentMode::Crime => {
            let assessment = session
                .planner
                .plan_crime(&config.origin, &config.destination)?;
            write_json(writer, &assessment)
        }
        AssessmentMode::Combined => {
            let assessment = session.planner.plan_combined(
                &config.origin,
                &config.destination,
                session.imagery.as_ref(),
                session.detector.as_ref(),
            )?;
            write_json(writer, &assessment)
        }
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
