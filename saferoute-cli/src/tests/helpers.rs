//! Test helpers for preparing model artefacts and stub collaborators.

use std::cell::RefCell;

use camino::{Utf8Path, Utf8PathBuf};
use saferoute_core::test_support::{
    ByteCountDetector, StubDirections, StubGeocoder, StubImagery, encode_points, point_in_band,
};
use saferoute_core::RouteCandidate;
use saferoute_model::{CLUSTERS_FILE, RISK_TABLE_FILE};
use tempfile::TempDir;

use crate::CliError;
use crate::services::{CollaboratorBuilder, Collaborators, ServiceConfig};

pub(super) const API_KEY: &str = "test-key";
pub(super) const HOME: &str = "home";
pub(super) const WORK: &str = "work";

const CLUSTERS_JSON: &[u8] = br#"{"centroids": [[0.0, 0.0], [10.0, 0.0], [20.0, 0.0]]}"#;
const RISK_TABLE_JSON: &[u8] = br#"{"risks": {"0": 0.1, "1": 0.5, "2": 0.9}}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
}

/// Temporary directory holding the model artefacts.
#[derive(Debug)]
pub(super) struct Workspace {
    _tmp: TempDir,
    pub(super) root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    /// Three clusters ten degrees of latitude apart with risks 0.1, 0.5 and
    /// 0.9.
    pub(super) fn with_artefacts() -> Self {
        let workspace = Self::new();
        workspace.write_artefacts();
        workspace
    }

    pub(super) fn write_artefacts(&self) {
        write_utf8(&self.root.join(CLUSTERS_FILE), CLUSTERS_JSON);
        write_utf8(&self.root.join(RISK_TABLE_FILE), RISK_TABLE_JSON);
    }
}

/// Candidate passing through the fixture cluster of each band.
pub(super) fn route_through(bands: &[u32]) -> RouteCandidate {
    let points: Vec<_> = bands.iter().map(|&band| point_in_band(band)).collect();
    RouteCandidate::new(encode_points(&points), 3.0, 12.0).expect("valid candidate")
}

/// Collaborators that never touch the network.
///
/// `home` sits in the low risk cluster and `work` in the high risk one. The
/// directions stub serves a high risk route followed by a low risk route,
/// and lamps are visible everywhere north of five degrees latitude.
#[derive(Debug, Default)]
pub(super) struct StubCollaboratorBuilder {
    pub(super) configs: RefCell<Vec<ServiceConfig>>,
}

impl CollaboratorBuilder for StubCollaboratorBuilder {
    fn build(&self, config: &ServiceConfig) -> Result<Collaborators, CliError> {
        self.configs.borrow_mut().push(config.clone());
        Ok(Collaborators {
            geocoder: Box::new(
                StubGeocoder::default()
                    .with_address(HOME, point_in_band(0))
                    .with_address(WORK, point_in_band(2)),
            ),
            directions: Box::new(StubDirections::new(vec![
                route_through(&[2, 2]),
                route_through(&[0, 0]),
            ])),
            imagery: Box::new(StubImagery::new(|point, _| Some(u8::from(point.lat > 5.0)))),
            detector: Box::new(ByteCountDetector),
        })
    }
}
