//! Plan trips from free-text or coordinate endpoints.
//!
//! [`TripPlanner`] resolves each endpoint through a [`Geocoder`] unless it is
//! already a coordinate, fetches candidates from a [`DirectionsProvider`],
//! and hands them to a [`RouteSafetyEngine`]. Geocoding and directions
//! failures abort the request; everything downstream degrades gracefully.

use std::str::FromStr;

use thiserror::Error;

use crate::directions::{DirectionsError, DirectionsProvider, GeocodeError, Geocoder};
use crate::engine::{CombinedAssessment, CrimeAssessment, RouteSafetyEngine};
use crate::lighting::{ImageryProvider, LampDetector, LightingReport, route_lighting_report};
use crate::risk::ClusterModel;
use crate::sampler::GeometryDecodeError;
use crate::{Coordinate, RouteCandidate};

/// Trip endpoint as supplied by a traveller.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// Free-text address to be geocoded.
    Address(String),
    /// Explicit coordinate.
    Point(Coordinate),
}

/// Error returned when a `"lat,lng"` pair is out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("coordinate out of range: {input}")]
pub struct LocationParseError {
    /// Rejected input.
    pub input: String,
}

impl FromStr for Location {
    type Err = LocationParseError;

    /// Parse `"lat,lng"` as a coordinate and anything else as an address.
    ///
    /// A pair of numbers outside WGS84 bounds is rejected rather than sent
    /// to the geocoder.
    ///
    /// # Examples
    /// ```
    /// use saferoute_core::{Coordinate, Location};
    ///
    /// assert_eq!(
    ///     "51.5, -0.12".parse::<Location>(),
    ///     Ok(Location::Point(Coordinate::new(51.5, -0.12)))
    /// );
    /// assert_eq!(
    ///     "221B Baker Street".parse::<Location>(),
    ///     Ok(Location::Address("221B Baker Street".to_owned()))
    /// );
    /// assert!("91,0".parse::<Location>().is_err());
    /// ```
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        parse_pair(trimmed).map_or_else(
            || Ok(Self::Address(trimmed.to_owned())),
            |point| {
                if point.is_valid() {
                    Ok(Self::Point(point))
                } else {
                    Err(LocationParseError {
                        input: trimmed.to_owned(),
                    })
                }
            },
        )
    }
}

fn parse_pair(input: &str) -> Option<Coordinate> {
    let (lat, lng) = input.split_once(',')?;
    Some(Coordinate::new(
        lat.trim().parse().ok()?,
        lng.trim().parse().ok()?,
    ))
}

impl From<Coordinate> for Location {
    fn from(point: Coordinate) -> Self {
        Self::Point(point)
    }
}

/// Errors that abort a trip plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// An endpoint could not be geocoded.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    /// No route could be fetched between the endpoints.
    #[error(transparent)]
    Directions(#[from] DirectionsError),
    /// The route used for a lighting report had malformed geometry.
    #[error(transparent)]
    Geometry(#[from] GeometryDecodeError),
}

/// Wires address resolution and directions into the assessment flows.
#[derive(Debug, Clone)]
pub struct TripPlanner<M, G, D> {
    engine: RouteSafetyEngine<M>,
    geocoder: G,
    directions: D,
}

impl<M, G, D> TripPlanner<M, G, D>
where
    M: ClusterModel,
    G: Geocoder,
    D: DirectionsProvider,
{
    /// Combine an engine with its upstream collaborators.
    #[must_use]
    pub const fn new(engine: RouteSafetyEngine<M>, geocoder: G, directions: D) -> Self {
        Self {
            engine,
            geocoder,
            directions,
        }
    }

    /// Assessment engine used for every plan.
    #[must_use]
    pub const fn engine(&self) -> &RouteSafetyEngine<M> {
        &self.engine
    }

    /// Resolve `location` to a coordinate.
    ///
    /// # Errors
    /// Returns [`GeocodeError`] when an address cannot be resolved.
    pub fn resolve(&self, location: &Location) -> Result<Coordinate, GeocodeError> {
        resolve_location(&self.geocoder, location)
    }

    /// Resolve both endpoints and fetch candidate routes between them.
    ///
    /// # Errors
    /// Returns [`PlanError`] when an endpoint cannot be geocoded or no route
    /// exists.
    pub fn candidates(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> Result<Vec<RouteCandidate>, PlanError> {
        fetch_candidates(&self.geocoder, &self.directions, origin, destination)
    }

    /// Plan a trip scored on crime risk alone.
    ///
    /// # Errors
    /// Returns [`PlanError`] when an endpoint cannot be geocoded or no route
    /// exists.
    pub fn plan_crime(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> Result<CrimeAssessment, PlanError> {
        let candidates = self.candidates(origin, destination)?;
        Ok(self.engine.assess_crime(&candidates))
    }

    /// Plan a trip scored on crime risk and street lighting.
    ///
    /// # Errors
    /// Returns [`PlanError`] when an endpoint cannot be geocoded or no route
    /// exists.
    pub fn plan_combined(
        &self,
        origin: &Location,
        destination: &Location,
        imagery: &dyn ImageryProvider,
        detector: &dyn LampDetector,
    ) -> Result<CombinedAssessment, PlanError> {
        let candidates = self.candidates(origin, destination)?;
        Ok(self.engine.assess_combined(&candidates, imagery, detector))
    }

    /// Full lighting report for the service's preferred route.
    ///
    /// # Errors
    /// Returns [`PlanError`] when an endpoint cannot be geocoded, no route
    /// exists, or the route geometry is malformed.
    pub fn lighting_report(
        &self,
        origin: &Location,
        destination: &Location,
        imagery: &dyn ImageryProvider,
        detector: &dyn LampDetector,
    ) -> Result<LightingReport, PlanError> {
        trip_lighting_report(
            &self.geocoder,
            &self.directions,
            origin,
            destination,
            self.engine.config().report_sample_points,
            imagery,
            detector,
        )
    }
}

/// Resolve `location` to a coordinate, geocoding addresses.
///
/// # Errors
/// Returns [`GeocodeError`] when an address cannot be resolved.
pub fn resolve_location<G>(geocoder: &G, location: &Location) -> Result<Coordinate, GeocodeError>
where
    G: Geocoder + ?Sized,
{
    match location {
        Location::Point(point) => Ok(*point),
        Location::Address(address) => geocoder.geocode(address),
    }
}

/// Resolve both endpoints and fetch candidate routes between them.
///
/// An empty answer from the directions service is reported as
/// [`DirectionsError::NoRouteFound`].
///
/// # Errors
/// Returns [`PlanError`] when an endpoint cannot be geocoded or no route
/// exists.
pub fn fetch_candidates<G, D>(
    geocoder: &G,
    directions: &D,
    origin: &Location,
    destination: &Location,
) -> Result<Vec<RouteCandidate>, PlanError>
where
    G: Geocoder + ?Sized,
    D: DirectionsProvider + ?Sized,
{
    let from = resolve_location(geocoder, origin)?;
    let to = resolve_location(geocoder, destination)?;
    let candidates = directions.directions(from, to)?;
    if candidates.is_empty() {
        return Err(DirectionsError::NoRouteFound {
            origin: from,
            destination: to,
        }
        .into());
    }
    log::debug!("fetched {} candidates from {from} to {to}", candidates.len());
    Ok(candidates)
}

/// Full lighting report for the directions service's preferred route.
///
/// Only the geocoder and directions service are consulted, so no risk model
/// needs to be loaded.
///
/// # Errors
/// Returns [`PlanError`] when an endpoint cannot be geocoded, no route
/// exists, or the route geometry is malformed.
pub fn trip_lighting_report<G, D>(
    geocoder: &G,
    directions: &D,
    origin: &Location,
    destination: &Location,
    max_points: usize,
    imagery: &dyn ImageryProvider,
    detector: &dyn LampDetector,
) -> Result<LightingReport, PlanError>
where
    G: Geocoder + ?Sized,
    D: DirectionsProvider + ?Sized,
{
    let candidates = fetch_candidates(geocoder, directions, origin, destination)?;
    let geometry = candidates
        .first()
        .map(RouteCandidate::encoded_geometry)
        .unwrap_or_default();
    Ok(route_lighting_report(geometry, max_points, imagery, detector)?)
}
