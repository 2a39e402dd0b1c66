//! Decode encoded route geometry and reduce it to representative waypoints.
//!
//! Geometry uses Google's encoded polyline format at five decimal places of
//! precision. Down-sampling is deterministic: a fixed integer stride is taken
//! from the first point, so the route's final point may be skipped.

use thiserror::Error;

use crate::Coordinate;

/// Precision used by Google's encoded polyline format.
pub const POLYLINE_PRECISION: u32 = 5;

/// Sample size used when scoring crime risk alone.
pub const CRIME_SAMPLE_POINTS: usize = 5;

/// Sample size used when crime risk and lighting are scored together.
pub const COMBINED_SAMPLE_POINTS: usize = 8;

/// Error raised when a route's encoded geometry is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode route geometry: {message}")]
pub struct GeometryDecodeError {
    /// Decoder diagnostic.
    pub message: String,
}

/// Ordered, bounded subset of a route's coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaypointSample {
    points: Vec<Coordinate>,
}

impl WaypointSample {
    /// Down-sample `points` to at most `max_points` entries.
    ///
    /// Inputs no longer than the limit are returned unchanged. Longer inputs
    /// keep every `floor(len / max_points)`-th point starting at index zero.
    /// A limit of zero is treated as one.
    ///
    /// # Examples
    /// ```
    /// use saferoute_core::{Coordinate, WaypointSample};
    ///
    /// let points: Vec<_> = (0..10).map(|i| Coordinate::new(f64::from(i), 0.0)).collect();
    /// let sample = WaypointSample::from_points(&points, 5);
    /// let lats: Vec<f64> = sample.iter().map(|p| p.lat).collect();
    /// assert_eq!(lats, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    /// ```
    #[must_use]
    pub fn from_points(points: &[Coordinate], max_points: usize) -> Self {
        let limit = max_points.max(1);
        if points.len() <= limit {
            return Self {
                points: points.to_vec(),
            };
        }
        let stride = points.len().checked_div(limit).unwrap_or(1).max(1);
        // The stride rule can overshoot the limit when the length is not a
        // multiple of it; keep the leading points.
        let sampled = points.iter().step_by(stride).take(limit).copied().collect();
        Self { points: sampled }
    }

    /// Sampled coordinates in route order.
    #[must_use]
    pub const fn points(&self) -> &[Coordinate] {
        self.points.as_slice()
    }

    /// Iterate over the sampled coordinates.
    pub fn iter(&self) -> std::slice::Iter<'_, Coordinate> {
        self.points.iter()
    }

    /// Number of sampled coordinates.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Report whether the sample holds no coordinates.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<'a> IntoIterator for &'a WaypointSample {
    type Item = &'a Coordinate;
    type IntoIter = std::slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Decode an encoded polyline into its full coordinate sequence.
///
/// An empty string decodes to an empty sequence.
///
/// # Errors
/// Returns [`GeometryDecodeError`] when the encoding is malformed.
///
/// # Examples
/// ```
/// use saferoute_core::decode_geometry;
///
/// let points = decode_geometry("_p~iF~ps|U_ulLnnqC_mqNvxq`@")?;
/// assert_eq!(points.len(), 3);
/// assert!((points[0].lat - 38.5).abs() < 1e-9);
/// assert!((points[0].lng + 120.2).abs() < 1e-9);
/// # Ok::<(), saferoute_core::GeometryDecodeError>(())
/// ```
pub fn decode_geometry(encoded: &str) -> Result<Vec<Coordinate>, GeometryDecodeError> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }
    let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION).map_err(|err| {
        GeometryDecodeError {
            message: err.to_string(),
        }
    })?;
    Ok(line.coords().copied().map(Coordinate::from).collect())
}

/// Decode `encoded` and down-sample it to at most `max_points` waypoints.
///
/// # Errors
/// Returns [`GeometryDecodeError`] when the encoding is malformed.
pub fn sample_waypoints(
    encoded: &str,
    max_points: usize,
) -> Result<WaypointSample, GeometryDecodeError> {
    let points = decode_geometry(encoded)?;
    Ok(WaypointSample::from_points(&points, max_points))
}
