//! Deterministic collaborators and fixture models used by unit, doc and
//! behaviour tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use geo::Coord;

use crate::directions::{DirectionsError, DirectionsProvider, GeocodeError, Geocoder};
use crate::lighting::{
    DetectionError, Heading, ImageryError, ImageryProvider, LampDetector, StreetImage,
};
use crate::sampler::POLYLINE_PRECISION;
use crate::service::ServiceError;
use crate::{CentroidModel, ClusterId, Coordinate, RiskLookup, RiskTable, RouteCandidate};

/// Risk of each fixture band, indexed by band.
pub const BAND_RISKS: [f64; 3] = [0.1, 0.5, 0.9];

/// Encode `points` as a precision-5 polyline.
///
/// Returns an empty string when a coordinate cannot be encoded.
#[must_use]
pub fn encode_points(points: &[Coordinate]) -> String {
    polyline::encode_coordinates(points.iter().copied().map(Coord::from), POLYLINE_PRECISION)
        .unwrap_or_default()
}

/// Fixture centroid of `band`, ten degrees of latitude apart per band.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "fixture spacing")]
pub fn point_in_band(band: u32) -> Coordinate {
    Coordinate::new(f64::from(band) * 10.0, 0.0)
}

/// Three-cluster lookup with risks 0.1, 0.5 and 0.9 for bands 0, 1 and 2.
///
/// # Panics
/// Panics if the built-in fixture centroids are rejected.
#[must_use]
#[expect(clippy::expect_used, reason = "fixture centroids are statically valid")]
pub fn banded_lookup() -> RiskLookup<CentroidModel> {
    let model = CentroidModel::new((0..3).map(point_in_band).collect())
        .expect("fixture centroids are finite and non-empty");
    let table = (0..)
        .zip(BAND_RISKS)
        .map(|(band, risk)| (ClusterId(band), risk))
        .collect::<RiskTable>();
    RiskLookup::new(model, table)
}

type ImageRule = dyn Fn(Coordinate, Heading) -> Option<u8> + Send + Sync;

/// Imagery stub whose images encode their lamp count in the first byte.
///
/// The rule decides per point and heading whether imagery exists and how
/// many lamps it shows. Pair it with [`ByteCountDetector`].
pub struct StubImagery {
    rule: Box<ImageRule>,
    calls: AtomicUsize,
}

impl StubImagery {
    /// Build imagery from a rule returning the lamp count, or `None` for
    /// missing imagery.
    pub fn new<F>(rule: F) -> Self
    where
        F: Fn(Coordinate, Heading) -> Option<u8> + Send + Sync + 'static,
    {
        Self {
            rule: Box::new(rule),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of images requested so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for StubImagery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubImagery")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

impl ImageryProvider for StubImagery {
    fn fetch_image(
        &self,
        point: Coordinate,
        heading: Heading,
    ) -> Result<Option<StreetImage>, ImageryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.rule)(point, heading).map(|lamps| StreetImage::new(vec![lamps])))
    }
}

/// Imagery provider that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingImagery;

impl ImageryProvider for FailingImagery {
    fn fetch_image(
        &self,
        point: Coordinate,
        _heading: Heading,
    ) -> Result<Option<StreetImage>, ImageryError> {
        Err(ServiceError::NetworkError {
            url: format!("stub://imagery/{point}"),
            message: "connection refused".to_owned(),
        }
        .into())
    }
}

/// Detector reporting the first byte of the image as the lamp count.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteCountDetector;

impl LampDetector for ByteCountDetector {
    fn count_lamps(&self, image: &StreetImage) -> Result<u32, DetectionError> {
        Ok(image.bytes.first().copied().map_or(0, u32::from))
    }
}

/// Detector that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingDetector;

impl LampDetector for FailingDetector {
    fn count_lamps(&self, _image: &StreetImage) -> Result<u32, DetectionError> {
        Err(ServiceError::Timeout {
            url: "stub://detector".to_owned(),
            timeout_secs: 30,
        }
        .into())
    }
}

/// Geocoder backed by a fixed address book.
#[derive(Debug, Default, Clone)]
pub struct StubGeocoder {
    addresses: HashMap<String, Coordinate>,
}

impl StubGeocoder {
    /// Register `address` at `point`.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>, point: Coordinate) -> Self {
        self.addresses.insert(address.into(), point);
        self
    }
}

impl Geocoder for StubGeocoder {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        self.addresses
            .get(address)
            .copied()
            .ok_or_else(|| GeocodeError::AddressNotFound {
                address: address.to_owned(),
            })
    }
}

/// Directions provider returning the same candidates for every request.
#[derive(Debug, Default, Clone)]
pub struct StubDirections {
    candidates: Vec<RouteCandidate>,
}

impl StubDirections {
    /// Serve `candidates` for every request.
    #[must_use]
    pub const fn new(candidates: Vec<RouteCandidate>) -> Self {
        Self { candidates }
    }
}

impl DirectionsProvider for StubDirections {
    fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<RouteCandidate>, DirectionsError> {
        if self.candidates.is_empty() {
            return Err(DirectionsError::NoRouteFound {
                origin,
                destination,
            });
        }
        Ok(self.candidates.clone())
    }
}
