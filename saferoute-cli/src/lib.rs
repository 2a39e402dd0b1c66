//! Command-line interface for planning safe routes.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod lighting;
mod plan;
mod services;

pub use error::CliError;

use lighting::{LightingArgs, run_lighting};
use plan::{PlanArgs, run_plan};

const ARG_FROM: &str = "from";
const ARG_TO: &str = "to";
const ARG_MODE: &str = "mode";
const ARG_POLYLINE: &str = "polyline";
const ARG_ARTEFACTS_DIR: &str = "artefacts-dir";
const ARG_CLUSTERS: &str = "clusters";
const ARG_RISK_TABLE: &str = "risk-table";
const ARG_GOOGLE_API_KEY: &str = "google-api-key";
const ARG_GOOGLE_BASE_URL: &str = "google-base-url";
const ARG_TRAVEL_MODE: &str = "travel-mode";
const ARG_DETECTOR_URL: &str = "detector-url";

const ENV_PLAN_FROM: &str = "SAFEROUTE_CMDS_PLAN_FROM";
const ENV_PLAN_TO: &str = "SAFEROUTE_CMDS_PLAN_TO";
const ENV_PLAN_GOOGLE_API_KEY: &str = "SAFEROUTE_CMDS_PLAN_GOOGLE_API_KEY";
const ENV_LIGHTING_POLYLINE: &str = "SAFEROUTE_CMDS_LIGHTING_POLYLINE";
const ENV_LIGHTING_FROM: &str = "SAFEROUTE_CMDS_LIGHTING_FROM";
const ENV_LIGHTING_TO: &str = "SAFEROUTE_CMDS_LIGHTING_TO";
const ENV_LIGHTING_GOOGLE_API_KEY: &str = "SAFEROUTE_CMDS_LIGHTING_GOOGLE_API_KEY";

/// Run the SafeRoute CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Lighting(args) => run_lighting(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "saferoute",
    about = "Score candidate routes for personal safety and pick a diverse set",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a trip and rank its alternative routes.
    Plan(PlanArgs),
    /// Report street lighting along a single route.
    Lighting(LightingArgs),
}

#[cfg(test)]
mod tests;
