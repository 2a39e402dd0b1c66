//! Geographic coordinates in decimal degrees.

use std::fmt;

use geo::Coord;

/// A `(latitude, longitude)` pair in WGS84 decimal degrees.
///
/// Converts losslessly to and from [`geo::Coord`], which stores longitude in
/// `x` and latitude in `y`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use saferoute_core::Coordinate;
///
/// let point = Coordinate::new(51.5, -0.12);
/// let coord: Coord<f64> = point.into();
/// assert_eq!(coord, Coord { x: -0.12, y: 51.5 });
/// assert_eq!(Coordinate::from(coord), point);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinate {
    /// Construct a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Return the coordinate as a `[lat, lng]` feature vector.
    #[must_use]
    pub const fn as_feature(self) -> [f64; 2] {
        [self.lat, self.lng]
    }

    /// Report whether both components are finite and inside WGS84 bounds.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lng: coord.x,
        }
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(point: Coordinate) -> Self {
        Self {
            x: point.lng,
            y: point.lat,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}
