//! Resolve addresses and fetch candidate routes.
//!
//! Both collaborators are external services. Adapters live in
//! `saferoute-data`; tests use the stubs in [`crate::test_support`].

use thiserror::Error;

use crate::service::ServiceError;
use crate::{Coordinate, RouteCandidate};

/// Errors from [`Geocoder::geocode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The geocoding service found no match for the address.
    #[error("could not geocode address: {address}")]
    AddressNotFound {
        /// Address as supplied by the caller.
        address: String,
    },
    /// The geocoding service failed.
    #[error("geocoding failed: {0}")]
    Service(#[from] ServiceError),
}

/// Errors from [`DirectionsProvider::directions`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectionsError {
    /// The directions service returned no route between the endpoints.
    #[error("no route found from {origin} to {destination}")]
    NoRouteFound {
        /// Requested origin.
        origin: Coordinate,
        /// Requested destination.
        destination: Coordinate,
    },
    /// The directions service failed.
    #[error("directions request failed: {0}")]
    Service(#[from] ServiceError),
}

/// Resolve a free-text address to a coordinate.
pub trait Geocoder: Send + Sync {
    /// Return the coordinate of the best match for `address`.
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError>;
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        (**self).geocode(address)
    }
}

/// Fetch alternative routes between two coordinates.
///
/// Implementations return candidates in the service's preference order and
/// report [`DirectionsError::NoRouteFound`] rather than an empty list.
///
/// # Examples
///
/// ```
/// use saferoute_core::{Coordinate, DirectionsError, DirectionsProvider, RouteCandidate};
///
/// struct StraightLine;
///
/// impl DirectionsProvider for StraightLine {
///     fn directions(
///         &self,
///         origin: Coordinate,
///         destination: Coordinate,
///     ) -> Result<Vec<RouteCandidate>, DirectionsError> {
///         if origin == destination {
///             return Err(DirectionsError::NoRouteFound { origin, destination });
///         }
///         Ok(vec![RouteCandidate::new("_p~iF~ps|U_ulLnnqC", 1.0, 12.0).expect("valid")])
///     }
/// }
///
/// let here = Coordinate::new(38.5, -120.2);
/// assert!(StraightLine.directions(here, here).is_err());
/// ```
pub trait DirectionsProvider: Send + Sync {
    /// Return the candidate routes from `origin` to `destination`.
    fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<RouteCandidate>, DirectionsError>;
}

impl<D: DirectionsProvider + ?Sized> DirectionsProvider for Box<D> {
    fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<RouteCandidate>, DirectionsError> {
        (**self).directions(origin, destination)
    }
}
