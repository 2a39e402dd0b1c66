//! Lighting command implementation for the SafeRoute CLI.

use std::io::Write;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use saferoute_core::{
    EngineConfig, LightingReport, Location, route_lighting_report, trip_lighting_report,
};
use serde::{Deserialize, Serialize};

use crate::plan::parse_location;
use crate::services::{
    CollaboratorBuilder, Collaborators, HttpCollaboratorBuilder, ServiceConfig, ServiceOptions,
    write_json,
};
use crate::{
    ARG_DETECTOR_URL, ARG_FROM, ARG_GOOGLE_API_KEY, ARG_GOOGLE_BASE_URL, ARG_POLYLINE, ARG_TO,
    ARG_TRAVEL_MODE, CliError, ENV_LIGHTING_FROM, ENV_LIGHTING_GOOGLE_API_KEY,
    ENV_LIGHTING_POLYLINE, ENV_LIGHTING_TO,
};

/// CLI arguments for the `lighting` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Report street lighting along one route. The route is either \
                 an encoded polyline or the preferred route between two \
                 endpoints. Every sampled point is checked in all four \
                 compass directions through Street View imagery and the \
                 lamp detector. The crime model is not consulted.",
    about = "Report street lighting along a single route"
)]
#[ortho_config(prefix = "SAFEROUTE")]
pub(crate) struct LightingArgs {
    /// Encoded polyline of the route to analyse.
    #[arg(long = ARG_POLYLINE, value_name = "polyline")]
    #[serde(default)]
    pub(crate) polyline: Option<String>,
    /// Trip origin as an address or "lat,lng".
    #[arg(long = ARG_FROM, value_name = "location")]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Trip destination as an address or "lat,lng".
    #[arg(long = ARG_TO, value_name = "location")]
    #[serde(default)]
    pub(crate) to: Option<String>,
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

impl LightingArgs {
    pub(crate) fn into_config(self) -> Result<LightingConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LightingConfig::try_from(merged)
    }
}

/// Route analysed by the `lighting` command.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RouteSource {
    /// Encoded polyline supplied directly.
    Polyline(String),
    /// Preferred route between two endpoints.
    Trip {
        origin: Location,
        destination: Location,
    },
}

/// Resolved `lighting` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct LightingConfig {
    pub(crate) route: RouteSource,
    pub(crate) services: ServiceConfig,
}

impl TryFrom<LightingArgs> for LightingConfig {
    type Error = CliError;

    fn try_from(args: LightingArgs) -> Result<Self, Self::Error> {
        let route = route_source(args.polyline, args.from, args.to)?;
        let services = ServiceOptions {
            google_api_key: args.google_api_key,
            google_base_url: args.google_base_url,
            travel_mode: args.travel_mode,
            detector_url: args.detector_url,
        }
        .resolve(ENV_LIGHTING_GOOGLE_API_KEY)?;
        Ok(Self { route, services })
    }
}

fn route_source(
    polyline: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<RouteSource, CliError> {
    match (polyline, from.is_some() || to.is_some()) {
        (Some(_), true) => Err(CliError::ConflictingArguments {
            first: ARG_POLYLINE,
            second: if from.is_some() { ARG_FROM } else { ARG_TO },
        }),
        (Some(polyline), false) => Ok(RouteSource::Polyline(polyline)),
        (None, true) => Ok(RouteSource::Trip {
            origin: parse_location(from, ARG_FROM, ENV_LIGHTING_FROM)?,
            destination: parse_location(to, ARG_TO, ENV_LIGHTING_TO)?,
        }),
        (None, false) => Err(CliError::MissingArgument {
            field: ARG_POLYLINE,
            env: ENV_LIGHTING_POLYLINE,
        }),
    }
}

pub(super) fn run_lighting(args: LightingArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_lighting_with(args, &HttpCollaboratorBuilder, &mut stdout)
}

pub(super) fn run_lighting_with(
    args: LightingArgs,
    builder: &dyn CollaboratorBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let collaborators = builder.build(&config.services)?;
    let report = lighting_report(&collaborators, &config.route)?;
    write_json(writer, &report)
}

fn lighting_report(
    collaborators: &Collaborators,
    route: &RouteSource,
) -> Result<LightingReport, CliError> {
    let max_points = EngineConfig::default().report_sample_points;
    let imagery = collaborators.imagery.as_ref();
    let detector = collaborators.detector.as_ref();
    match route {
        RouteSource::Polyline(polyline) => Ok(route_lighting_report(
            polyline, max_points, imagery, detector,
        )?),
        RouteSource::Trip {
            origin,
            destination,
        } => Ok(trip_lighting_report(
            collaborators.geocoder.as_ref(),
            collaborators.directions.as_ref(),
            origin,
            destination,
            max_points,
            imagery,
            detector,
        )?),
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<LightingConfig, CliError> {
    let merged = LightingArgs::merge_from_layers(layers).map_err(CliError::from)?;
    LightingConfig::try_from(merged)
}
