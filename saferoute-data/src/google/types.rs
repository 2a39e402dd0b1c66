//! Google Maps web service response types.
//!
//! Only the fields the adapters read are modelled; everything else in the
//! responses is ignored. Each response carries a top-level `status` that
//! decides between a result, a "nothing found" outcome, and a rejection.
//!
//! See: <https://developers.google.com/maps/documentation/directions/get-directions>

use saferoute_core::{
    Coordinate, DirectionsError, GeocodeError, RouteCandidate, RouteCandidateError, ServiceError,
};
use serde::Deserialize;

/// Request succeeded and at least one result was returned.
pub const STATUS_OK: &str = "OK";
/// Request succeeded but nothing matched.
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
/// An endpoint of a directions request could not be geocoded.
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";

/// Directions API response.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    /// Status code, e.g. `"OK"` or `"OVER_QUERY_LIMIT"`.
    pub status: String,
    /// Diagnostic accompanying a non-`OK` status.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Alternative routes in the service's preference order.
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

/// One route of a directions response.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsRoute {
    /// Smoothed geometry of the whole route.
    pub overview_polyline: OverviewPolyline,
    /// Legs between consecutive waypoints; one leg without waypoints.
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// Encoded polyline of a route.
#[derive(Debug, Clone, Deserialize)]
pub struct OverviewPolyline {
    /// Precision-5 encoded polyline.
    pub points: String,
}

/// Distance and duration of one leg.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteLeg {
    /// Leg distance in metres.
    pub distance: Measure,
    /// Leg duration in seconds.
    pub duration: Measure,
}

/// Numeric value with its human-readable rendering omitted.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Measure {
    /// Value in the measure's base unit.
    pub value: f64,
}

impl DirectionsRoute {
    /// Convert to a candidate, summing distance and duration over the legs.
    ///
    /// # Errors
    /// Returns [`RouteCandidateError`] when the totals are negative or
    /// non-finite.
    pub fn into_candidate(self) -> Result<RouteCandidate, RouteCandidateError> {
        let distance_m: f64 = self.legs.iter().map(|leg| leg.distance.value).sum();
        let duration_s: f64 = self.legs.iter().map(|leg| leg.duration.value).sum();
        RouteCandidate::from_directions(self.overview_polyline.points, distance_m, duration_s)
    }
}

impl DirectionsResponse {
    /// Convert the response into candidates for `origin` to `destination`.
    ///
    /// Routes with unusable distance or duration are skipped with a warning.
    ///
    /// # Errors
    /// Returns [`DirectionsError::NoRouteFound`] when the service found no
    /// usable route, and [`DirectionsError::Service`] when it rejected the
    /// request.
    pub fn into_candidates(
        self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<RouteCandidate>, DirectionsError> {
        let not_found = DirectionsError::NoRouteFound {
            origin,
            destination,
        };
        match self.status.as_str() {
            STATUS_OK => {}
            STATUS_ZERO_RESULTS | STATUS_NOT_FOUND => return Err(not_found),
            _ => return Err(rejected(self.status, self.error_message).into()),
        }
        let candidates: Vec<RouteCandidate> = self
            .routes
            .into_iter()
            .enumerate()
            .filter_map(|(index, route)| {
                route
                    .into_candidate()
                    .inspect_err(|err| log::warn!("skipping directions route {index}: {err}"))
                    .ok()
            })
            .collect();
        if candidates.is_empty() {
            return Err(not_found);
        }
        Ok(candidates)
    }
}

/// Geocoding API response.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    /// Status code, e.g. `"OK"` or `"ZERO_RESULTS"`.
    pub status: String,
    /// Diagnostic accompanying a non-`OK` status.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Matches ordered by relevance.
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

/// One geocoding match.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    /// Location of the match.
    pub geometry: GeocodeGeometry,
}

/// Geometry of a geocoding match.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeGeometry {
    /// Representative point of the match.
    pub location: LatLng,
}

/// Latitude and longitude literal.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl From<LatLng> for Coordinate {
    fn from(point: LatLng) -> Self {
        Self::new(point.lat, point.lng)
    }
}

impl GeocodeResponse {
    /// Coordinate of the best match for `address`.
    ///
    /// # Errors
    /// Returns [`GeocodeError::AddressNotFound`] when nothing matched, and
    /// [`GeocodeError::Service`] when the service rejected the request.
    pub fn into_coordinate(self, address: &str) -> Result<Coordinate, GeocodeError> {
        let not_found = || GeocodeError::AddressNotFound {
            address: address.to_owned(),
        };
        match self.status.as_str() {
            STATUS_OK => self
                .results
                .into_iter()
                .next()
                .map(|result| result.geometry.location.into())
                .ok_or_else(not_found),
            STATUS_ZERO_RESULTS => Err(not_found()),
            _ => Err(rejected(self.status, self.error_message).into()),
        }
    }
}

fn rejected(status: String, message: Option<String>) -> ServiceError {
    ServiceError::Rejected {
        status,
        message: message.unwrap_or_default(),
    }
}
