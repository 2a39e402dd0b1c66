//! Focused unit tests covering CLI configuration and collaborator wiring.

use super::helpers::{API_KEY, StubCollaboratorBuilder, Workspace, write_utf8};
use super::*;
use crate::lighting::{LightingArgs, LightingConfig, RouteSource, run_lighting_with};
use crate::plan::{AssessmentMode, PlanArgs, PlanConfig, run_plan_with};
use crate::services::{ArtefactOptions, ServiceOptions, open_session, validate_artefacts};
use camino::Utf8PathBuf;
use rstest::rstest;
use saferoute_core::test_support::{encode_points, point_in_band};
use saferoute_core::{Coordinate, LightingReport, Location};
use saferoute_data::{DEFAULT_DETECTOR_URL, DEFAULT_GOOGLE_BASE_URL, TravelMode};
use saferoute_model::{CLUSTERS_FILE, RISK_TABLE_FILE};

fn plan_args() -> PlanArgs {
    PlanArgs {
        from: Some("home".to_owned()),
        to: Some("51.5, -0.12".to_owned()),
        google_api_key: Some(API_KEY.to_owned()),
        ..PlanArgs::default()
    }
}

#[rstest]
#[case::origin(None, Some("work"), ARG_FROM, ENV_PLAN_FROM)]
#[case::destination(Some("home"), None, ARG_TO, ENV_PLAN_TO)]
#[case::blank_origin(Some("  "), Some("work"), ARG_FROM, ENV_PLAN_FROM)]
fn converting_plan_without_endpoints_errors(
    #[case] from: Option<&str>,
    #[case] to: Option<&str>,
    #[case] expected_field: &'static str,
    #[case] expected_env: &'static str,
) {
    let args = PlanArgs {
        from: from.map(str::to_owned),
        to: to.map(str::to_owned),
        ..plan_args()
    };

    let err = PlanConfig::try_from(args).expect_err("missing endpoint should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_plan_without_api_key_errors() {
    let args = PlanArgs {
        google_api_key: None,
        ..plan_args()
    };

    let err = PlanConfig::try_from(args).expect_err("missing key should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_GOOGLE_API_KEY);
            assert_eq!(env, ENV_PLAN_GOOGLE_API_KEY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn plan_config_applies_defaults() {
    let config = PlanConfig::try_from(plan_args()).expect("config should build");

    assert_eq!(config.origin, Location::Address("home".to_owned()));
    assert_eq!(
        config.destination,
        Location::Point(Coordinate::new(51.5, -0.12))
    );
    assert_eq!(config.mode, AssessmentMode::Crime);
    assert_eq!(
        config.artefacts.clusters,
        Utf8PathBuf::from(".").join(CLUSTERS_FILE)
    );
    assert_eq!(
        config.artefacts.risk_table,
        Utf8PathBuf::from(".").join(RISK_TABLE_FILE)
    );
    assert_eq!(config.services.google.api_key, API_KEY);
    assert_eq!(config.services.google.base_url, DEFAULT_GOOGLE_BASE_URL);
    assert_eq!(config.services.google.travel_mode, TravelMode::Driving);
    assert_eq!(config.services.detector.endpoint, DEFAULT_DETECTOR_URL);
}

#[rstest]
#[case("crime", AssessmentMode::Crime)]
#[case("Combined", AssessmentMode::Combined)]
#[case(" combined ", AssessmentMode::Combined)]
fn parses_assessment_modes(#[case] input: &str, #[case] expected: AssessmentMode) {
    let args = PlanArgs {
        mode: Some(input.to_owned()),
        ..plan_args()
    };
    let config = PlanConfig::try_from(args).expect("config should build");
    assert_eq!(config.mode, expected);
}

#[rstest]
fn rejects_unknown_assessment_mode() {
    let args = PlanArgs {
        mode: Some("fastest".to_owned()),
        ..plan_args()
    };
    let err = PlanConfig::try_from(args).expect_err("unknown mode should error");
    match err {
        CliError::InvalidMode { value } => assert_eq!(value, "fastest"),
        other => panic!("expected InvalidMode, found {other:?}"),
    }
}

#[rstest]
fn rejects_unknown_travel_mode() {
    let args = PlanArgs {
        travel_mode: Some("hovercraft".to_owned()),
        ..plan_args()
    };
    let err = PlanConfig::try_from(args).expect_err("unknown travel mode should error");
    assert!(matches!(err, CliError::InvalidTravelMode(_)));
}

#[rstest]
fn rejects_out_of_range_coordinates() {
    let args = PlanArgs {
        to: Some("95.0, 10.0".to_owned()),
        ..plan_args()
    };
    let err = PlanConfig::try_from(args).expect_err("latitude out of range");
    match err {
        CliError::InvalidLocation { field, .. } => assert_eq!(field, ARG_TO),
        other => panic!("expected InvalidLocation, found {other:?}"),
    }
}

#[rstest]
fn artefact_options_prefer_explicit_paths() {
    let paths = ArtefactOptions {
        artefacts_dir: Some(Utf8PathBuf::from("models")),
        risk_table: Some(Utf8PathBuf::from("elsewhere/risks.json")),
        ..ArtefactOptions::default()
    }
    .resolve();

    assert_eq!(paths.clusters, Utf8PathBuf::from("models").join(CLUSTERS_FILE));
    assert_eq!(paths.risk_table, Utf8PathBuf::from("elsewhere/risks.json"));
}

#[rstest]
fn service_options_apply_overrides() {
    let options = ServiceOptions {
        google_api_key: Some(API_KEY.to_owned()),
        google_base_url: Some("http://maps.test".to_owned()),
        travel_mode: Some("walking".to_owned()),
        detector_url: Some("http://detector.test/detect".to_owned()),
    };

    let config = options
        .resolve(ENV_PLAN_GOOGLE_API_KEY)
        .expect("options should resolve");

    assert_eq!(config.google.base_url, "http://maps.test");
    assert_eq!(config.google.travel_mode, TravelMode::Walking);
    assert_eq!(config.detector.endpoint, "http://detector.test/detect");
}

fn workspace_artefacts(workspace: &Workspace) -> saferoute_model::ArtefactPaths {
    ArtefactOptions {
        artefacts_dir: Some(workspace.root.clone()),
        ..ArtefactOptions::default()
    }
    .resolve()
}

#[rstest]
#[case::clusters(CLUSTERS_FILE, ARG_CLUSTERS)]
#[case::risk_table(RISK_TABLE_FILE, ARG_RISK_TABLE)]
fn validate_artefacts_reports_missing_files(
    #[case] missing: &str,
    #[case] expected_field: &'static str,
) {
    let workspace = Workspace::with_artefacts();
    std::fs::remove_file(workspace.root.join(missing)).expect("remove artefact");

    let err = validate_artefacts(&workspace_artefacts(&workspace)).expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_artefacts_reports_not_file() {
    let workspace = Workspace::with_artefacts();
    let clusters = workspace.root.join("clusters-dir");
    std::fs::create_dir(&clusters).expect("clusters directory");
    let paths = ArtefactOptions {
        artefacts_dir: Some(workspace.root.clone()),
        clusters: Some(clusters),
        ..ArtefactOptions::default()
    }
    .resolve();

    let err = validate_artefacts(&paths).expect_err("expected failure");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_CLUSTERS),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn open_session_reports_invalid_model() {
    let workspace = Workspace::with_artefacts();
    write_utf8(&workspace.root.join(RISK_TABLE_FILE), br#"{"risks": {"north": 0.5}}"#);
    let services = ServiceOptions {
        google_api_key: Some(API_KEY.to_owned()),
        ..ServiceOptions::default()
    }
    .resolve(ENV_PLAN_GOOGLE_API_KEY)
    .expect("options should resolve");

    let err = open_session(
        &workspace_artefacts(&workspace),
        &services,
        &StubCollaboratorBuilder::default(),
    )
    .err()
    .expect("non-numeric cluster key should be rejected");
    assert!(matches!(err, CliError::LoadModel(_)));
}

#[rstest]
fn open_session_accepts_risks_outside_unit_range() {
    let workspace = Workspace::with_artefacts();
    write_utf8(
        &workspace.root.join(RISK_TABLE_FILE),
        br#"{"risks": {"0": 0.1, "1": 0.5, "2": 1.2}}"#,
    );
    let services = ServiceOptions {
        google_api_key: Some(API_KEY.to_owned()),
        ..ServiceOptions::default()
    }
    .resolve(ENV_PLAN_GOOGLE_API_KEY)
    .expect("options should resolve");

    let session = open_session(
        &workspace_artefacts(&workspace),
        &services,
        &StubCollaboratorBuilder::default(),
    );
    assert!(session.is_ok(), "a risk of 1.2 should still load");
}

#[rstest]
fn run_plan_passes_service_config_to_builder() {
    let workspace = Workspace::with_artefacts();
    let args = PlanArgs {
        artefacts_dir: Some(workspace.root.clone()),
        travel_mode: Some("bicycling".to_owned()),
        ..plan_args()
    };
    let builder = StubCollaboratorBuilder::default();
    let mut stdout = Vec::new();

    // `home` resolves through the stub geocoder; the destination is a point.
    run_plan_with(args, &builder, &mut stdout).expect("plan should succeed");

    let configs = builder.configs.borrow();
    let config = configs.first().expect("builder invoked");
    assert_eq!(config.google.travel_mode, TravelMode::Bicycling);
    assert!(stdout.ends_with(b"\n"));
}

#[rstest]
#[case::from(Some("home"), None, ARG_FROM)]
#[case::to(None, Some("work"), ARG_TO)]
fn lighting_polyline_conflicts_with_endpoints(
    #[case] from: Option<&str>,
    #[case] to: Option<&str>,
    #[case] expected_second: &'static str,
) {
    let args = LightingArgs {
        polyline: Some("_p~iF~ps|U".to_owned()),
        from: from.map(str::to_owned),
        to: to.map(str::to_owned),
        google_api_key: Some(API_KEY.to_owned()),
        ..LightingArgs::default()
    };

    let err = LightingConfig::try_from(args).expect_err("conflicting sources");
    match err {
        CliError::ConflictingArguments { first, second } => {
            assert_eq!(first, ARG_POLYLINE);
            assert_eq!(second, expected_second);
        }
        other => panic!("expected ConflictingArguments, found {other:?}"),
    }
}

#[rstest]
fn lighting_requires_a_route() {
    let args = LightingArgs {
        google_api_key: Some(API_KEY.to_owned()),
        ..LightingArgs::default()
    };
    let err = LightingConfig::try_from(args).expect_err("no route supplied");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_POLYLINE);
            assert_eq!(env, ENV_LIGHTING_POLYLINE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn lighting_trip_requires_both_endpoints() {
    let args = LightingArgs {
        from: Some("home".to_owned()),
        google_api_key: Some(API_KEY.to_owned()),
        ..LightingArgs::default()
    };
    let err = LightingConfig::try_from(args).expect_err("destination missing");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_TO);
            assert_eq!(env, ENV_LIGHTING_TO);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn lighting_accepts_trip_endpoints() {
    let args = LightingArgs {
        from: Some("home".to_owned()),
        to: Some("work".to_owned()),
        google_api_key: Some(API_KEY.to_owned()),
        ..LightingArgs::default()
    };
    let config = LightingConfig::try_from(args).expect("config should build");
    assert_eq!(
        config.route,
        RouteSource::Trip {
            origin: Location::Address("home".to_owned()),
            destination: Location::Address("work".to_owned()),
        }
    );
}

#[rstest]
fn lighting_runs_without_model_artefacts() {
    let polyline = encode_points(&[point_in_band(1), point_in_band(2)]);
    let args = LightingArgs {
        polyline: Some(polyline),
        google_api_key: Some(API_KEY.to_owned()),
        ..LightingArgs::default()
    };
    let builder = StubCollaboratorBuilder::default();
    let mut stdout = Vec::new();

    // Nothing on disk: the working directory holds no clusters or risk table.
    run_lighting_with(args, &builder, &mut stdout).expect("lighting should succeed");

    assert_eq!(builder.configs.borrow().len(), 1);
    let report: LightingReport = serde_json::from_slice(&stdout).expect("JSON lighting report");
    assert_eq!(report.points_sampled, 2);
    assert_eq!(report.well_lit_points, 2);
}

#[rstest]
fn lighting_rejects_malformed_polyline() {
    let args = LightingArgs {
        polyline: Some("   ".to_owned()),
        google_api_key: Some(API_KEY.to_owned()),
        ..LightingArgs::default()
    };
    let mut stdout = Vec::new();

    let err = run_lighting_with(args, &StubCollaboratorBuilder::default(), &mut stdout)
        .expect_err("spaces are not valid polyline characters");
    assert!(matches!(err, CliError::Geometry(_)));
    assert!(stdout.is_empty());
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "from": 42 }));

    let err = crate::plan::config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence_and_defaults_paths() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let workspace = Workspace::new();
    let cli_dir = workspace.root.join("from-cli");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "artefacts_dir": workspace.root.join("from-file").as_str(),
            "google_base_url": "http://from-file.test",
            "mode": "combined",
        }),
        None,
    );
    composer.push_environment(json!({
        "from": "home",
        "to": "work",
        "google_api_key": "from-env",
        "artefacts_dir": workspace.root.join("from-env").as_str(),
    }));
    composer.push_cli(json!({
        "artefacts_dir": cli_dir.as_str(),
    }));

    let config = crate::plan::config_from_layers_for_test(composer.layers())
        .expect("merged config should build");
    assert_eq!(config.origin, Location::Address("home".to_owned()));
    assert_eq!(config.mode, AssessmentMode::Combined);
    assert_eq!(config.artefacts.clusters, cli_dir.join(CLUSTERS_FILE));
    assert_eq!(config.artefacts.risk_table, cli_dir.join(RISK_TABLE_FILE));
    assert_eq!(config.services.google.api_key, "from-env");
    assert_eq!(config.services.google.base_url, "http://from-file.test");
}

#[rstest]
fn lighting_merge_layers_reads_polyline_from_file() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({ "polyline": "_p~iF~ps|U", "google_api_key": "from-file" }),
        None,
    );

    let config = crate::lighting::config_from_layers_for_test(composer.layers())
        .expect("merged config should build");
    assert_eq!(config.route, RouteSource::Polyline("_p~iF~ps|U".to_owned()));
}
