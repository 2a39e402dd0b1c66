//! Behavioural tests for converting Google Maps responses.
//!
//! These tests feed recorded response bodies through the public response
//! types, so no API key or network access is required.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use saferoute_core::{Coordinate, DirectionsError, GeocodeError, RouteCandidate, ServiceError};
use saferoute_data::google::types::{DirectionsResponse, GeocodeResponse};
use std::cell::RefCell;

const ORIGIN: Coordinate = Coordinate::new(51.5007, -0.1246);
const DESTINATION: Coordinate = Coordinate::new(51.5081, -0.0759);
const ADDRESS: &str = "1 Nowhere Lane";

#[derive(Default)]
struct GoogleWorld {
    body: RefCell<String>,
    directions: RefCell<Option<Result<Vec<RouteCandidate>, DirectionsError>>>,
    geocode: RefCell<Option<Result<Coordinate, GeocodeError>>>,
}

impl GoogleWorld {
    fn directions(&self) -> Result<Vec<RouteCandidate>, DirectionsError> {
        self.directions
            .borrow()
            .clone()
            .expect("directions result recorded")
    }
}

#[fixture]
fn world() -> GoogleWorld {
    GoogleWorld::default()
}

// --- Given steps ---

#[given("a directions response with two alternative routes")]
fn two_routes(#[from(world)] world: &GoogleWorld) {
    world.body.replace(
        r#"{
            "status": "OK",
            "routes": [
                {"summary": "Embankment",
                 "overview_polyline": {"points": "_p~iF~ps|U_ulLnnqC"},
                 "legs": [{"distance": {"text": "4.1 km", "value": 4100},
                           "duration": {"text": "12 mins", "value": 720}}]},
                {"summary": "Strand",
                 "overview_polyline": {"points": "_ulLnnqC_mqNvxq`@"},
                 "legs": [{"distance": {"text": "3.8 km", "value": 3800},
                           "duration": {"text": "15 mins", "value": 900}}]}
            ]
        }"#
        .to_owned(),
    );
}

#[given("a directions response with zero results")]
fn zero_routes(#[from(world)] world: &GoogleWorld) {
    world
        .body
        .replace(r#"{"status": "ZERO_RESULTS", "routes": []}"#.to_owned());
}

#[given("a directions response denying the request")]
fn denied(#[from(world)] world: &GoogleWorld) {
    world.body.replace(
        r#"{"status": "REQUEST_DENIED", "error_message": "API key missing", "routes": []}"#
            .to_owned(),
    );
}

#[given("a geocoding response with zero results")]
fn no_address(#[from(world)] world: &GoogleWorld) {
    world
        .body
        .replace(r#"{"status": "ZERO_RESULTS", "results": []}"#.to_owned());
}

// --- When steps ---

#[when("the directions response is converted")]
fn convert_directions(#[from(world)] world: &GoogleWorld) {
    let response: DirectionsResponse =
        serde_json::from_str(&world.body.borrow()).expect("response deserialises");
    world
        .directions
        .replace(Some(response.into_candidates(ORIGIN, DESTINATION)));
}

#[when("the geocoding response is converted")]
fn convert_geocode(#[from(world)] world: &GoogleWorld) {
    let response: GeocodeResponse =
        serde_json::from_str(&world.body.borrow()).expect("response deserialises");
    world.geocode.replace(Some(response.into_coordinate(ADDRESS)));
}

// --- Then steps ---

#[then("two candidates are returned in service order")]
fn two_candidates(#[from(world)] world: &GoogleWorld) {
    let candidates = world.directions().expect("conversion succeeds");
    let durations: Vec<f64> = candidates.iter().map(RouteCandidate::duration_min).collect();
    assert_eq!(durations, vec![12.0, 15.0]);
    assert_eq!(
        candidates.first().map(RouteCandidate::distance_km),
        Some(4.1)
    );
}

#[then("no route is found")]
fn no_route(#[from(world)] world: &GoogleWorld) {
    assert_eq!(
        world.directions(),
        Err(DirectionsError::NoRouteFound {
            origin: ORIGIN,
            destination: DESTINATION,
        })
    );
}

#[then("the request is reported as rejected with status {status}")]
fn rejected(#[from(world)] world: &GoogleWorld, status: String) {
    match world.directions() {
        Err(DirectionsError::Service(ServiceError::Rejected {
            status: reported,
            message,
        })) => {
            assert_eq!(reported, status);
            assert_eq!(message, "API key missing");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[then("the address is reported as not found")]
fn address_not_found(#[from(world)] world: &GoogleWorld) {
    let result = world.geocode.borrow().clone().expect("geocode result recorded");
    assert_eq!(
        result,
        Err(GeocodeError::AddressNotFound {
            address: ADDRESS.to_owned(),
        })
    );
}

// --- Scenario registrations ---

macro_rules! register_google_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/google_responses.feature", name = $title)]
        fn $fn_name(#[from(world)] world: GoogleWorld) {
            let _ = world;
        }
    };
}

register_google_scenario!(alternatives_become_candidates, "alternative routes become candidates");
register_google_scenario!(empty_directions_no_route, "an empty directions response means no route");
register_google_scenario!(denied_is_service_error, "a denied directions request is a service error");
register_google_scenario!(unknown_address_not_found, "an unknown address is not found");
