//! Collaborator wiring shared by the `plan` and `lighting` commands.

use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use saferoute_core::{
    CentroidModel, DirectionsProvider, Geocoder, ImageryProvider, LampDetector, RouteSafetyEngine,
    TripPlanner,
};
use saferoute_data::{
    DetectorConfig, GoogleDirectionsProvider, GoogleGeocoder, GoogleMapsConfig, HttpLampDetector,
    ProviderBuildError, StreetViewImagery, TravelMode,
};
use saferoute_model::{ArtefactPaths, CLUSTERS_FILE, RISK_TABLE_FILE, load_risk_lookup};
use serde::Serialize;

use crate::{ARG_CLUSTERS, ARG_GOOGLE_API_KEY, ARG_RISK_TABLE, CliError};

/// Model artefact locations, as merged from all layers.
#[derive(Debug, Clone, Default)]
pub(crate) struct ArtefactOptions {
    pub(crate) artefacts_dir: Option<Utf8PathBuf>,
    pub(crate) clusters: Option<Utf8PathBuf>,
    pub(crate) risk_table: Option<Utf8PathBuf>,
}

impl ArtefactOptions {
    /// Explicit paths win; otherwise the standard file names are looked up
    /// in `artefacts_dir`, which defaults to the working directory.
    pub(crate) fn resolve(self) -> ArtefactPaths {
        let artefacts_dir = self
            .artefacts_dir
            .unwrap_or_else(|| Utf8PathBuf::from("."));
        let clusters = self
            .clusters
            .unwrap_or_else(|| artefacts_dir.join(CLUSTERS_FILE));
        let risk_table = self
            .risk_table
            .unwrap_or_else(|| artefacts_dir.join(RISK_TABLE_FILE));
        ArtefactPaths::new(clusters, risk_table)
    }
}

/// Remote service options common to every command, as merged from all
/// layers.
#[derive(Debug, Clone, Default)]
pub(crate) struct ServiceOptions {
    pub(crate) google_api_key: Option<String>,
    pub(crate) google_base_url: Option<String>,
    pub(crate) travel_mode: Option<String>,
    pub(crate) detector_url: Option<String>,
}

impl ServiceOptions {
    /// Apply defaults and validate values. `api_key_env` names the variable
    /// reported when the API key is missing.
    pub(crate) fn resolve(self, api_key_env: &'static str) -> Result<ServiceConfig, CliError> {
        let api_key = self.google_api_key.ok_or(CliError::MissingArgument {
            field: ARG_GOOGLE_API_KEY,
            env: api_key_env,
        })?;

        let travel_mode = self
            .travel_mode
            .as_deref()
            .map(str::parse::<TravelMode>)
            .transpose()?
            .unwrap_or_default();
        let mut google = GoogleMapsConfig::new(api_key).with_travel_mode(travel_mode);
        if let Some(base_url) = self.google_base_url {
            google = google.with_base_url(base_url);
        }
        let detector = self
            .detector_url
            .map_or_else(DetectorConfig::default, DetectorConfig::new);

        Ok(ServiceConfig { google, detector })
    }
}

/// Resolved remote service configuration.
#[derive(Debug, Clone)]
pub(crate) struct ServiceConfig {
    pub(crate) google: GoogleMapsConfig,
    pub(crate) detector: DetectorConfig,
}

/// Check that both artefacts exist as regular files before loading them.
pub(crate) fn validate_artefacts(paths: &ArtefactPaths) -> Result<(), CliError> {
    require_existing(&paths.clusters, ARG_CLUSTERS)?;
    require_existing(&paths.risk_table, ARG_RISK_TABLE)?;
    Ok(())
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
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

fn file_is_file(path: &Utf8Path) -> std::io::Result<bool> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("path should include a file name"))?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.metadata(name).map(|meta| meta.is_file())
}

/// External collaborators used by a command run.
pub(crate) struct Collaborators {
    pub(crate) geocoder: Box<dyn Geocoder>,
    pub(crate) directions: Box<dyn DirectionsProvider>,
    pub(crate) imagery: Box<dyn ImageryProvider>,
    pub(crate) detector: Box<dyn LampDetector>,
}

/// Builds the collaborators for the current invocation.
pub(crate) trait CollaboratorBuilder {
    fn build(&self, config: &ServiceConfig) -> Result<Collaborators, CliError>;
}

/// Builds the Google Maps and HTTP detector adapters.
pub(crate) struct HttpCollaboratorBuilder;

impl CollaboratorBuilder for HttpCollaboratorBuilder {
    fn build(&self, config: &ServiceConfig) -> Result<Collaborators, CliError> {
        let google = &config.google;
        let google_error = |service| {
            move |source| CliError::BuildProvider {
                service,
                url: google.base_url.clone(),
                source,
            }
        };
        let geocoder =
            GoogleGeocoder::with_config(google.clone()).map_err(google_error("geocoding"))?;
        let directions = GoogleDirectionsProvider::with_config(google.clone())
            .map_err(google_error("directions"))?;
        let imagery =
            StreetViewImagery::with_config(google.clone()).map_err(google_error("street view"))?;
        let detector = HttpLampDetector::with_config(config.detector.clone()).map_err(
            |source: ProviderBuildError| CliError::BuildProvider {
                service: "lamp detector",
                url: config.detector.endpoint.clone(),
                source,
            },
        )?;
        Ok(Collaborators {
            geocoder: Box::new(geocoder),
            directions: Box::new(directions),
            imagery: Box::new(imagery),
            detector: Box::new(detector),
        })
    }
}

pub(crate) type Planner = TripPlanner<CentroidModel, Box<dyn Geocoder>, Box<dyn DirectionsProvider>>;

/// Loaded model plus collaborators, ready to answer one command.
pub(crate) struct Session {
    pub(crate) planner: Planner,
    pub(crate) imagery: Box<dyn ImageryProvider>,
    pub(crate) detector: Box<dyn LampDetector>,
}

/// Validate artefact paths, load the model and build the collaborators.
pub(crate) fn open_session(
    artefacts: &ArtefactPaths,
    services: &ServiceConfig,
    builder: &dyn CollaboratorBuilder,
) -> Result<Session, CliError> {
    validate_artefacts(artefacts)?;
    let lookup = load_risk_lookup(artefacts)?;
    let Collaborators {
        geocoder,
        directions,
        imagery,
        detector,
    } = builder.build(services)?;
    let engine = RouteSafetyEngine::new(Arc::new(lookup));
    Ok(Session {
        planner: TripPlanner::new(engine, geocoder, directions),
        imagery,
        detector,
    })
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
