//! Load the pretrained cluster model and risk table artefacts.
//!
//! Both artefacts are JSON files produced by the offline training pipeline:
//!
//! - `clusters.json` lists the k-means centroids ordered by cluster id:
//!   `{"centroids": [[lat, lng], ...]}`.
//! - `risk_table.json` maps cluster ids to normalised risk values:
//!   `{"risks": {"0": 0.12, "1": 0.87}}`.
//!
//! They are read once at start-up into a [`RiskLookup`] that is immutable
//! afterwards and can be shared between requests.
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use saferoute_model::{ArtefactPaths, load_risk_lookup};
//!
//! let paths = ArtefactPaths::in_dir(Utf8Path::new("artefacts"));
//! let lookup = load_risk_lookup(&paths).expect("load model artefacts");
//! assert!(!lookup.model().is_empty());
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::collections::BTreeMap;
use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use saferoute_core::{
    CentroidModel, CentroidModelError, ClusterId, Coordinate, RiskLookup, RiskTable,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

mod error;

pub use error::ModelError;

/// File name of the cluster model inside an artefacts directory.
pub const CLUSTERS_FILE: &str = "clusters.json";
/// File name of the risk table inside an artefacts directory.
pub const RISK_TABLE_FILE: &str = "risk_table.json";

/// Locations of the two model artefacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactPaths {
    /// Path to `clusters.json`.
    pub clusters: Utf8PathBuf,
    /// Path to `risk_table.json`.
    pub risk_table: Utf8PathBuf,
}

impl ArtefactPaths {
    /// Pair explicit artefact paths.
    #[must_use]
    pub fn new(clusters: impl Into<Utf8PathBuf>, risk_table: impl Into<Utf8PathBuf>) -> Self {
        Self {
            clusters: clusters.into(),
            risk_table: risk_table.into(),
        }
    }

    /// Standard artefact file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Utf8Path) -> Self {
        Self::new(dir.join(CLUSTERS_FILE), dir.join(RISK_TABLE_FILE))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClustersFile {
    centroids: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RiskTableFile {
    risks: BTreeMap<String, f64>,
}

fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, ModelError> {
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        ModelError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the nearest-centroid cluster model from `path`.
///
/// # Errors
/// Returns [`ModelError`] when the file cannot be read or parsed, lists no
/// centroids, or contains an unusable centroid.
pub fn load_cluster_model(path: &Utf8Path) -> Result<CentroidModel, ModelError> {
    let ClustersFile { centroids } = read_json(path)?;
    let points = centroids
        .into_iter()
        .map(|[lat, lng]| Coordinate::new(lat, lng))
        .collect();
    CentroidModel::new(points).map_err(|err| match err {
        CentroidModelError::Empty => ModelError::EmptyModel {
            path: path.to_path_buf(),
        },
        CentroidModelError::NonFinite { index } => ModelError::InvalidCentroid {
            path: path.to_path_buf(),
            index,
        },
        CentroidModelError::TooMany { count } => ModelError::TooManyCentroids {
            path: path.to_path_buf(),
            count,
        },
    })
}

/// Load the cluster risk table from `path`.
///
/// Keys must be decimal cluster ids and values finite numbers. Risks are
/// conventionally within `0.0..=1.0`; entries outside that range are kept
/// as recorded and logged.
///
/// # Errors
/// Returns [`ModelError`] when the file cannot be read or parsed, or an
/// entry has a malformed key or a non-finite risk.
pub fn load_risk_table(path: &Utf8Path) -> Result<RiskTable, ModelError> {
    let RiskTableFile { risks } = read_json(path)?;
    risks
        .into_iter()
        .map(|(key, risk)| {
            let invalid = |reason| ModelError::InvalidRisk {
                path: path.to_path_buf(),
                key: key.clone(),
                reason,
            };
            let cluster = key
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid("is not a cluster id"))?;
            if !risk.is_finite() {
                return Err(invalid("is not a finite number"));
            }
            if !(0.0..=1.0).contains(&risk) {
                log::warn!("risk {risk} for cluster {cluster} in {path} is outside 0.0..=1.0");
            }
            Ok((ClusterId(cluster), risk))
        })
        .collect()
}

/// Load both artefacts into a shareable lookup.
///
/// Mismatches between the model and the table are logged rather than
/// rejected: clusters without a recorded risk resolve to `0.0`.
///
/// # Errors
/// Returns [`ModelError`] when either artefact fails to load.
pub fn load_risk_lookup(paths: &ArtefactPaths) -> Result<RiskLookup<CentroidModel>, ModelError> {
    let model = load_cluster_model(&paths.clusters)?;
    let table = load_risk_table(&paths.risk_table)?;
    report_coverage(&model, &table);
    log::debug!(
        "loaded {} clusters from {} and {} risks from {}",
        model.len(),
        paths.clusters,
        table.len(),
        paths.risk_table
    );
    Ok(RiskLookup::new(model, table))
}

fn report_coverage(model: &CentroidModel, table: &RiskTable) {
    let clusters = model.len();
    let known = table
        .iter()
        .filter(|(cluster, _)| usize::try_from(cluster.0).is_ok_and(|id| id < clusters))
        .count();
    let unknown = table.len().saturating_sub(known);
    if unknown > 0 {
        log::warn!("risk table lists {unknown} clusters absent from the model");
    }
    let missing = clusters.saturating_sub(known);
    if missing > 0 {
        log::warn!("{missing} clusters have no recorded risk and score 0.0");
    }
}
