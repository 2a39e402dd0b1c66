//! Error types raised while loading model artefacts.
#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while loading the cluster model or the risk table.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Opening or reading an artefact failed.
    #[error("failed to read model artefact at {path}")]
    Read {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// An artefact was not valid JSON of the expected shape.
    #[error("failed to parse model artefact at {path}")]
    Parse {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The cluster artefact lists no centroids.
    #[error("cluster model at {path} has no centroids")]
    EmptyModel {
        /// Artefact path.
        path: Utf8PathBuf,
    },
    /// A centroid could not be used for prediction.
    #[error("centroid {index} in {path} is unusable")]
    InvalidCentroid {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Position of the centroid in the artefact.
        index: usize,
    },
    /// The cluster artefact has more centroids than cluster ids can name.
    #[error("cluster model at {path} has too many centroids ({count})")]
    TooManyCentroids {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Number of centroids in the artefact.
        count: usize,
    },
    /// A risk table entry was malformed.
    #[error("risk table entry {key:?} in {path} {reason}")]
    InvalidRisk {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Key of the offending entry.
        key: String,
        /// What was wrong with the entry.
        reason: &'static str,
    },
}
