//! Candidate routes supplied by the directions collaborator and the scored
//! routes returned to callers.

use thiserror::Error;

use crate::{Hotspot, RiskLevel};

/// One alternative route between an origin and a destination.
///
/// Geometry arrives as a Google encoded polyline; distance and duration are
/// validated on construction so downstream components never see negative or
/// non-finite values.
///
/// # Examples
/// ```
/// use saferoute_core::RouteCandidate;
///
/// let candidate = RouteCandidate::from_directions("_p~iF~ps|U_ulLnnqC", 2_500.0, 600.0)?;
/// assert_eq!(candidate.distance_km(), 2.5);
/// assert_eq!(candidate.duration_min(), 10.0);
/// # Ok::<(), saferoute_core::RouteCandidateError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "CandidateFields"))]
pub struct RouteCandidate {
    encoded_geometry: String,
    distance_km: f64,
    duration_min: f64,
}

/// Errors returned by [`RouteCandidate::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteCandidateError {
    /// Distance was negative or not a finite number.
    #[error("route distance must be a finite, non-negative number of kilometres (got {0})")]
    InvalidDistance(f64),
    /// Duration was negative or not a finite number.
    #[error("route duration must be a finite, non-negative number of minutes (got {0})")]
    InvalidDuration(f64),
}

impl RouteCandidate {
    /// Validate and construct a candidate from kilometres and minutes.
    ///
    /// # Errors
    /// Returns [`RouteCandidateError`] when distance or duration is negative
    /// or non-finite.
    pub fn new(
        encoded_geometry: impl Into<String>,
        distance_km: f64,
        duration_min: f64,
    ) -> Result<Self, RouteCandidateError> {
        if !is_non_negative(distance_km) {
            return Err(RouteCandidateError::InvalidDistance(distance_km));
        }
        if !is_non_negative(duration_min) {
            return Err(RouteCandidateError::InvalidDuration(duration_min));
        }
        Ok(Self {
            encoded_geometry: encoded_geometry.into(),
            distance_km,
            duration_min,
        })
    }

    /// Construct a candidate from the metres and seconds reported by a
    /// directions service.
    ///
    /// # Errors
    /// Returns [`RouteCandidateError`] when either value is negative or
    /// non-finite.
    #[expect(
        clippy::float_arithmetic,
        reason = "unit conversion from metres and seconds"
    )]
    pub fn from_directions(
        encoded_geometry: impl Into<String>,
        distance_m: f64,
        duration_s: f64,
    ) -> Result<Self, RouteCandidateError> {
        Self::new(encoded_geometry, distance_m / 1_000.0, duration_s / 60.0)
    }

    /// Encoded polyline describing the route.
    #[must_use]
    pub fn encoded_geometry(&self) -> &str {
        &self.encoded_geometry
    }

    /// Route length in kilometres.
    #[must_use]
    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Expected travel time in minutes.
    #[must_use]
    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct CandidateFields {
    encoded_geometry: String,
    distance_km: f64,
    duration_min: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<CandidateFields> for RouteCandidate {
    type Error = RouteCandidateError;

    fn try_from(fields: CandidateFields) -> Result<Self, Self::Error> {
        Self::new(fields.encoded_geometry, fields.distance_km, fields.duration_min)
    }
}

/// A candidate route after scoring and classification.
///
/// `lighting_ratio` and `safety_rating` are only present when the route was
/// assessed by the combined flow. `hotspots` are populated for routes that
/// survived selection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredRoute {
    /// One-based position of the candidate in the directions response.
    pub id: usize,
    /// Route length in kilometres.
    pub distance_km: f64,
    /// Expected travel time in minutes.
    pub duration_min: f64,
    /// Unweighted mean of the sampled per-point crime risk.
    pub mean_risk: f64,
    /// Fraction of sampled points classified as well lit.
    pub lighting_ratio: Option<f64>,
    /// Composite safety rating on a 0 to 5 scale.
    pub safety_rating: Option<f64>,
    /// Risk band relative to the other candidates of the same request.
    pub risk_level: RiskLevel,
    /// Sampled points whose risk exceeds the high-risk threshold.
    pub hotspots: Vec<Hotspot>,
    /// Original encoded geometry.
    pub encoded_geometry: String,
}

impl ScoredRoute {
    /// Display name used by clients, e.g. `"Route 2"`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("Route {}", self.id)
    }

    /// Whole-percent share of well-lit sample points, rounded down.
    ///
    /// # Examples
    /// ```
    /// use saferoute_core::{RiskLevel, ScoredRoute};
    ///
    /// let route = ScoredRoute {
    ///     id: 1,
    ///     distance_km: 1.0,
    ///     duration_min: 5.0,
    ///     mean_risk: 0.2,
    ///     lighting_ratio: Some(0.625),
    ///     safety_rating: Some(3.7),
    ///     risk_level: RiskLevel::Low,
    ///     hotspots: Vec::new(),
    ///     encoded_geometry: String::new(),
    /// };
    /// assert_eq!(route.well_lit_percent(), Some(62));
    /// ```
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "ratio is clamped to 0..=1 before scaling to a percentage"
    )]
    pub fn well_lit_percent(&self) -> Option<u8> {
        self.lighting_ratio
            .map(|ratio| (ratio.clamp(0.0, 1.0) * 100.0).floor() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1.0, 1.0)]
    #[case(f64::NAN, 1.0)]
    #[case(f64::INFINITY, 1.0)]
    fn rejects_invalid_distance(#[case] distance: f64, #[case] duration: f64) {
        let err = RouteCandidate::new("", distance, duration).expect_err("invalid distance");
        assert!(matches!(err, RouteCandidateError::InvalidDistance(_)));
    }

    #[rstest]
    fn rejects_negative_duration() {
        let err = RouteCandidate::new("", 1.0, -0.5).expect_err("invalid duration");
        assert_eq!(err, RouteCandidateError::InvalidDuration(-0.5));
    }

    #[rstest]
    fn accepts_zero_length_routes() {
        let candidate = RouteCandidate::new("??", 0.0, 0.0).expect("zero is valid");
        assert_eq!(candidate.encoded_geometry(), "??");
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserialisation_rejects_unknown_fields() {
        let json = r#"{"encoded_geometry":"??","distance_km":1.0,"duration_min":2.0,"eta":3}"#;
        let result: Result<RouteCandidate, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserialisation_validates_values() {
        let json = r#"{"encoded_geometry":"??","distance_km":-1.0,"duration_min":2.0}"#;
        let result: Result<RouteCandidate, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
