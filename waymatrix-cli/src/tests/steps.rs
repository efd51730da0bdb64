//! Behaviour-driven step definitions driving the matrix CLI scenarios.

use super::helpers::{SHOPS, STOPS, StubClientBuilder, Workspace};
use super::*;
use crate::matrix::run_matrix_with;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use waymatrix_core::test_support::{StubMatrixClient, uniform_response};

#[derive(Debug)]
struct MatrixWorld {
    workspace: Workspace,
    stops: Utf8PathBuf,
    shops: Utf8PathBuf,
    cli_args: RefCell<Vec<String>>,
    builder: StubClientBuilder,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl MatrixWorld {
    fn new() -> Self {
        let workspace = Workspace::new();
        let stops = workspace.path("stops.geojson");
        let shops = workspace.path("shops.geojson");
        Self {
            workspace,
            stops,
            shops,
            cli_args: RefCell::new(Vec::new()),
            builder: StubClientBuilder::new(StubMatrixClient::with_response(uniform_response(
                2, 2, 3600.0, 1000.0,
            ))),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn push_option(&self, name: &str, value: &str) {
        self.cli_args
            .borrow_mut()
            .extend([format!("--{name}"), value.to_owned()]);
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["waymatrix".to_owned(), "matrix".to_owned()];
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> MatrixWorld {
    MatrixWorld::new()
}

#[given("stop and shop layers exist on disk")]
fn layers_exist(#[from(world)] world: &MatrixWorld) {
    world.workspace.layer("stops.geojson", STOPS);
    world.workspace.layer("shops.geojson", SHOPS);
}

#[given("I pass both layers with their ID fields")]
fn pass_both_layers(#[from(world)] world: &MatrixWorld) {
    world.push_option(ARG_SOURCE, world.stops.as_str());
    world.push_option(ARG_SOURCE_FIELD, "name");
    world.push_option(ARG_DESTINATION, world.shops.as_str());
    world.push_option(ARG_DESTINATION_FIELD, "ref");
}

#[given("I pass the stop layer as source and destination")]
fn pass_stop_layer_twice(#[from(world)] world: &MatrixWorld) {
    world.push_option(ARG_SOURCE, world.stops.as_str());
    world.push_option(ARG_SOURCE_FIELD, "name");
    world.push_option(ARG_DESTINATION, world.stops.as_str());
    world.push_option(ARG_DESTINATION_FIELD, "name");
}

#[given("I pass a destination layer that does not exist")]
fn pass_missing_destination(#[from(world)] world: &MatrixWorld) {
    let missing = world.workspace.path("missing.geojson");
    world.push_option(ARG_SOURCE, world.stops.as_str());
    world.push_option(ARG_SOURCE_FIELD, "name");
    world.push_option(ARG_DESTINATION, missing.as_str());
    world.push_option(ARG_DESTINATION_FIELD, "ref");
}

#[given("I select the travel profile {profile}")]
fn select_profile(#[from(world)] world: &MatrixWorld, profile: String) {
    world.push_option(ARG_PROFILE, &profile);
}

#[when("I run the matrix command")]
fn run_matrix_command(#[from(world)] world: &MatrixWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Matrix(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_matrix_with(args, &world.builder, &mut *buffer)
        }
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints {count} CSV rows")]
fn command_prints_rows(#[from(world)] world: &MatrixWorld, count: usize) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let stdout = String::from_utf8(world.stdout.borrow().clone()).expect("stdout utf-8");
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.first(), Some(&"FROM_ID,TO_ID,DURATION_HOURS,DISTANCE_KM"));
    assert_eq!(lines.len(), count + 1);
    assert_eq!(lines.get(1), Some(&"A,7,1,1"));
}

#[then("the routing service receives {count} shared locations")]
fn shared_locations(#[from(world)] world: &MatrixWorld, count: usize) {
    let calls = world.builder.client().calls();
    let body = &calls.first().expect("one request").body;
    assert_eq!(body.locations.len(), count);
    assert_eq!(body.sources, body.destinations);
}

#[then("the command fails because the profile is unknown")]
fn command_fails_unknown_profile(#[from(world)] world: &MatrixWorld) {
    match &*world.error() {
        CliError::InvalidProfile(err) => assert_eq!(err.name, "hovercraft"),
        other => panic!("expected InvalidProfile, found {other:?}"),
    }
    assert!(world.builder.client().calls().is_empty());
}

#[then("the command fails because the destination file is missing")]
fn command_fails_missing_destination(#[from(world)] world: &MatrixWorld) {
    match &*world.error() {
        CliError::MissingSourceFile { field, .. } => assert_eq!(*field, ARG_DESTINATION),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
    assert!(world.stdout.borrow().is_empty());
}

macro_rules! register_matrix_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/matrix_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: MatrixWorld) {
            let _ = world;
        }
    };
}

register_matrix_scenario!(matrix_to_stdout, "writing a CSV matrix to stdout");
register_matrix_scenario!(self_matrix, "computing the matrix of a layer against itself");
register_matrix_scenario!(unknown_profile, "rejecting an unknown travel profile");
register_matrix_scenario!(missing_destination, "rejecting a missing destination layer");
