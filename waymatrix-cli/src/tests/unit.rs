//! Focused unit tests covering matrix CLI configuration and execution.

use super::helpers::{MULTI_STOPS, SHOPS, STOPS, StubClientBuilder, Workspace};
use super::*;
use crate::matrix::{MatrixConfig, OutputFormat, config_from_layers_for_test, run_matrix_with};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::time::Duration;
use waymatrix_core::test_support::StubMatrixClient;
use waymatrix_core::{ApiError, MatrixError, MatrixResponse, Profile};

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

fn response() -> MatrixResponse {
    MatrixResponse::from_values(
        vec![vec![3600.0, 7200.0], vec![1800.0, 3600.0]],
        vec![vec![1000.0, 2000.0], vec![500.0, 1000.0]],
    )
}

fn complete_args(workspace: &Workspace) -> MatrixArgs {
    MatrixArgs {
        source: Some(workspace.layer("stops.geojson", STOPS)),
        source_field: Some("name".to_owned()),
        destination: Some(workspace.layer("shops.geojson", SHOPS)),
        destination_field: Some("ref".to_owned()),
        ..MatrixArgs::default()
    }
}

#[rstest]
#[case::source(ARG_SOURCE, ENV_SOURCE)]
#[case::source_field(ARG_SOURCE_FIELD, ENV_SOURCE_FIELD)]
#[case::destination(ARG_DESTINATION, ENV_DESTINATION)]
#[case::destination_field(ARG_DESTINATION_FIELD, ENV_DESTINATION_FIELD)]
fn converting_without_required_fields_errors(
    workspace: Workspace,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let mut args = complete_args(&workspace);
    match field {
        ARG_SOURCE => args.source = None,
        ARG_SOURCE_FIELD => args.source_field = None,
        ARG_DESTINATION => args.destination = None,
        _ => args.destination_field = None,
    }

    let err = MatrixConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn matrix_config_applies_defaults(workspace: Workspace) {
    let config = MatrixConfig::try_from(complete_args(&workspace)).expect("config should build");

    assert_eq!(config.profile, Profile::DrivingCar);
    assert_eq!(config.format, OutputFormat::Csv);
    assert_eq!(config.base_url, "https://api.openrouteservice.org");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.output, None);
    assert!(!config.is_self_matrix());
}

#[rstest]
fn matrix_config_parses_profile_format_and_timeout(workspace: Workspace) {
    let args = MatrixArgs {
        profile: Some("Cycling-Road".to_owned()),
        format: Some("JSON".to_owned()),
        timeout_secs: Some(5),
        ..complete_args(&workspace)
    };

    let config = MatrixConfig::try_from(args).expect("config should build");

    assert_eq!(config.profile, Profile::CyclingRoad);
    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(config.timeout, Duration::from_secs(5));
}

#[rstest]
fn unknown_profiles_are_rejected(workspace: Workspace) {
    let args = MatrixArgs {
        profile: Some("hovercraft".to_owned()),
        ..complete_args(&workspace)
    };

    match MatrixConfig::try_from(args).expect_err("profile should be rejected") {
        CliError::InvalidProfile(err) => assert_eq!(err.name, "hovercraft"),
        other => panic!("expected InvalidProfile, found {other:?}"),
    }
}

#[rstest]
fn unknown_formats_are_rejected(workspace: Workspace) {
    let args = MatrixArgs {
        format: Some("xlsx".to_owned()),
        ..complete_args(&workspace)
    };

    match MatrixConfig::try_from(args).expect_err("format should be rejected") {
        CliError::InvalidFormat { value } => assert_eq!(value, "xlsx"),
        other => panic!("expected InvalidFormat, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_files(workspace: Workspace) {
    let args = MatrixArgs {
        destination: Some(workspace.path("absent.geojson")),
        ..complete_args(&workspace)
    };
    let config = MatrixConfig::try_from(args).expect("config should build");

    match config.validate_sources().expect_err("expected failure") {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_DESTINATION);
            assert_eq!(path, workspace.path("absent.geojson"));
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories(workspace: Workspace) {
    let dir = workspace.path("layers");
    std::fs::create_dir(dir.as_std_path()).expect("create dir");
    let args = MatrixArgs {
        source: Some(dir),
        ..complete_args(&workspace)
    };
    let config = MatrixConfig::try_from(args).expect("config should build");

    match config.validate_sources().expect_err("expected failure") {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_SOURCE),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "timeout_secs": "soon" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence(workspace: Workspace) {
    use ortho_config::MergeComposer;

    let stops = workspace.path("stops.geojson");
    let shops = workspace.path("shops.geojson");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "source": stops.as_str(),
            "destination": stops.as_str(),
            "profile": "foot-walking",
            "base_url": "http://from-file:8080/ors",
        }),
        None,
    );
    composer.push_environment(json!({
        "source_field": "name",
        "destination_field": "name",
        "profile": "cycling-regular",
    }));
    composer.push_cli(json!({
        "destination": shops.as_str(),
        "destination_field": "ref",
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.source, stops);
    assert_eq!(config.destination, shops);
    assert_eq!(config.source_field, "name");
    assert_eq!(config.destination_field, "ref");
    assert_eq!(config.profile, Profile::CyclingRegular);
    assert_eq!(config.base_url, "http://from-file:8080/ors");
}

#[rstest]
fn run_writes_csv_to_stdout(workspace: Workspace) {
    let builder = StubClientBuilder::new(StubMatrixClient::with_response(response()));
    let mut stdout = Vec::new();

    run_matrix_with(complete_args(&workspace), &builder, &mut stdout).expect("matrix succeeds");

    assert_eq!(
        String::from_utf8(stdout).expect("utf-8 output"),
        "FROM_ID,TO_ID,DURATION_HOURS,DISTANCE_KM\n\
         A,7,1,1\n\
         A,8,2,2\n\
         B,7,0.5,0.5\n\
         B,8,1,1\n"
    );
    let calls = builder.client().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].endpoint, "/v2/matrix/driving-car");
    assert_eq!(calls[0].body.destinations, vec![2, 3]);
}

#[rstest]
fn run_writes_json_to_the_output_file(workspace: Workspace) {
    let builder = StubClientBuilder::new(StubMatrixClient::with_response(response()));
    let target = workspace.path("out/matrix.json");
    let args = MatrixArgs {
        output: Some(target.clone()),
        format: Some("json".to_owned()),
        ..complete_args(&workspace)
    };
    let mut stdout = Vec::new();

    run_matrix_with(args, &builder, &mut stdout).expect("matrix succeeds");

    assert!(stdout.is_empty());
    let written = std::fs::read_to_string(target.as_std_path()).expect("output written");
    let value: Value = serde_json::from_str(&written).expect("valid json");
    assert_eq!(
        value[0],
        json!({"FROM_ID": "A", "TO_ID": 7, "DURATION_HOURS": 1.0, "DISTANCE_KM": 1.0})
    );
    assert_eq!(value.as_array().map(Vec::len), Some(4));
}

#[rstest]
fn same_path_runs_a_self_matrix(workspace: Workspace) {
    let stops = workspace.layer("stops.geojson", STOPS);
    let builder = StubClientBuilder::new(StubMatrixClient::with_response(response()));
    let args = MatrixArgs {
        source: Some(stops.clone()),
        source_field: Some("name".to_owned()),
        destination: Some(stops),
        destination_field: Some("name".to_owned()),
        ..MatrixArgs::default()
    };
    let mut stdout = Vec::new();

    run_matrix_with(args, &builder, &mut stdout).expect("matrix succeeds");

    let calls = builder.client().calls();
    assert_eq!(calls[0].body.locations.len(), 2);
    assert_eq!(calls[0].body.sources, vec![0, 1]);
    assert_eq!(calls[0].body.destinations, vec![0, 1]);
    assert!(builder.configs()[0].is_self_matrix());
}

#[rstest]
fn api_failures_write_nothing(workspace: Workspace) {
    let builder = StubClientBuilder::new(StubMatrixClient::with_error(ApiError::Status {
        url: "http://ors/v2/matrix/driving-car".to_owned(),
        status: 403,
        code: None,
        message: "Forbidden".to_owned(),
    }));
    let target = workspace.path("matrix.csv");
    let args = MatrixArgs {
        output: Some(target.clone()),
        ..complete_args(&workspace)
    };
    let mut stdout = Vec::new();

    let err = run_matrix_with(args, &builder, &mut stdout).expect_err("matrix fails");

    match err {
        CliError::Matrix(inner) => assert!(matches!(*inner, MatrixError::Api(_))),
        other => panic!("expected Matrix, found {other:?}"),
    }
    assert!(stdout.is_empty());
    assert!(!target.as_std_path().exists());
}

#[rstest]
fn multi_point_layers_never_reach_the_client(workspace: Workspace) {
    let builder = StubClientBuilder::new(StubMatrixClient::with_response(response()));
    let args = MatrixArgs {
        source: Some(workspace.layer("multi.geojson", MULTI_STOPS)),
        ..complete_args(&workspace)
    };
    let mut stdout = Vec::new();

    let err = run_matrix_with(args, &builder, &mut stdout).expect_err("matrix fails");

    match err {
        CliError::Matrix(inner) => {
            assert!(matches!(*inner, MatrixError::InvalidGeometryType { .. }));
        }
        other => panic!("expected Matrix, found {other:?}"),
    }
    assert!(builder.client().calls().is_empty());
}

#[rstest]
fn malformed_layers_surface_as_load_errors(workspace: Workspace) {
    let builder = StubClientBuilder::new(StubMatrixClient::with_response(response()));
    let args = MatrixArgs {
        destination: Some(workspace.layer("broken.geojson", "{ not geojson")),
        ..complete_args(&workspace)
    };
    let mut stdout = Vec::new();

    let err = run_matrix_with(args, &builder, &mut stdout).expect_err("matrix fails");

    match err {
        CliError::LoadLayer { field, .. } => assert_eq!(field, ARG_DESTINATION),
        other => panic!("expected LoadLayer, found {other:?}"),
    }
}
