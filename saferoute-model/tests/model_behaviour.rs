//! Behavioural coverage for loading the cluster model and risk table.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use saferoute_core::{CentroidModel, Coordinate, RiskLookup};
use saferoute_model::{ArtefactPaths, CLUSTERS_FILE, ModelError, RISK_TABLE_FILE, load_risk_lookup};
use tempfile::TempDir;

const TWO_CLUSTERS: &str = r#"{"centroids": [[51.5, -0.12], [51.6, -0.02]]}"#;

struct ModelWorld {
    dir: TempDir,
    result: RefCell<Option<Result<RiskLookup<CentroidModel>, ModelError>>>,
}

impl ModelWorld {
    fn paths(&self) -> ArtefactPaths {
        let dir = Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("temporary directory is not UTF-8: {}", path.display()));
        ArtefactPaths::in_dir(&dir)
    }

    fn write(&self, name: &str, contents: &str) {
        let path = self.dir.path().join(name);
        if let Err(err) = std::fs::write(&path, contents) {
            panic!("write {}: {err}", path.display());
        }
    }
}

#[fixture]
fn world() -> ModelWorld {
    match TempDir::new() {
        Ok(dir) => ModelWorld {
            dir,
            result: RefCell::new(None),
        },
        Err(err) => panic!("create temporary directory: {err}"),
    }
}

#[given("an artefacts directory with two clusters and their risks")]
fn complete_artefacts(#[from(world)] world: &ModelWorld) {
    world.write(CLUSTERS_FILE, TWO_CLUSTERS);
    world.write(RISK_TABLE_FILE, r#"{"risks": {"0": 0.2, "1": 0.9}}"#);
}

#[given("an artefacts directory whose risk table omits the second cluster")]
fn partial_table(#[from(world)] world: &ModelWorld) {
    world.write(CLUSTERS_FILE, TWO_CLUSTERS);
    world.write(RISK_TABLE_FILE, r#"{"risks": {"0": 0.2}}"#);
}

#[given("an artefacts directory without a risk table")]
fn missing_table(#[from(world)] world: &ModelWorld) {
    world.write(CLUSTERS_FILE, TWO_CLUSTERS);
}

#[when("the risk lookup is loaded")]
fn load(#[from(world)] world: &ModelWorld) {
    world.result.replace(Some(load_risk_lookup(&world.paths())));
}

#[then("a point near the second centroid has risk {risk}")]
#[expect(
    clippy::float_arithmetic,
    reason = "assertions compare floating-point risks"
)]
fn risk_near_second(#[from(world)] world: &ModelWorld, risk: f64) {
    let binding = world.result.borrow();
    match binding.as_ref() {
        Some(Ok(lookup)) => {
            let found = lookup.lookup(Coordinate::new(51.59, -0.03)).risk;
            assert!((found - risk).abs() < 1e-12, "expected {risk}, got {found}");
        }
        Some(Err(err)) => panic!("loading should succeed, got {err}"),
        None => panic!("load result must be recorded"),
    }
}

#[then("loading fails because the risk table cannot be read")]
fn fails_to_read(#[from(world)] world: &ModelWorld) {
    let binding = world.result.borrow();
    match binding.as_ref() {
        Some(Err(ModelError::Read { path, .. })) => {
            assert_eq!(path.file_name(), Some(RISK_TABLE_FILE));
        }
        Some(Err(other)) => panic!("unexpected error: {other}"),
        Some(Ok(_)) => panic!("loading should fail"),
        None => panic!("load result must be recorded"),
    }
}

macro_rules! register_model_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/model.feature", name = $title)]
        fn $fn_name(#[from(world)] world: ModelWorld) {
            let _ = world;
        }
    };
}

register_model_scenario!(artefacts_load, "artefacts load into a risk lookup");
register_model_scenario!(missing_clusters_zero, "clusters missing from the table score zero");
register_model_scenario!(missing_table_reported, "a missing risk table is reported");
