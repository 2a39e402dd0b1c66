//! Estimate how well lit a route is from street-level imagery.
//!
//! Each sampled coordinate is probed at four compass headings. An
//! [`ImageryProvider`] fetches the image for a heading and a
//! [`LampDetector`] counts the street lamps visible in it. Two modes exist:
//!
//! - quick mode ([`LightingEstimator::lighting_profile`]) stops probing a
//!   point at the first heading with a detection and reports the share of
//!   well-lit points;
//! - full mode ([`LightingEstimator::lighting_report`]) probes every heading
//!   and accumulates lamp counts for a detailed report.
//!
//! Missing imagery and collaborator failures never abort an estimate. The
//! affected heading contributes no detections and the failure is logged.

use std::fmt;

use thiserror::Error;

use crate::Coordinate;
use crate::sampler::{GeometryDecodeError, sample_waypoints};
use crate::service::ServiceError;

/// Compass direction a street-level image is taken towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    /// 0 degrees.
    North,
    /// 90 degrees.
    East,
    /// 180 degrees.
    South,
    /// 270 degrees.
    West,
}

impl Heading {
    /// Headings probed at every sampled point, in probing order.
    pub const PROBE_ORDER: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Bearing in whole degrees clockwise from north.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::North => 0,
            Self::East => 90,
            Self::South => 180,
            Self::West => 270,
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.degrees().fmt(f)
    }
}

/// Raw street-level image returned by an [`ImageryProvider`].
#[derive(Clone, PartialEq, Eq, Default)]
pub struct StreetImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// MIME type reported by the imagery service, if any.
    pub content_type: Option<String>,
}

impl StreetImage {
    /// Wrap encoded image bytes without a content type.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: None,
        }
    }

    /// Attach the MIME type reported by the imagery service.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for StreetImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreetImage")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Errors from [`ImageryProvider::fetch_image`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageryError {
    /// The imagery service could not be reached or rejected the request.
    #[error("imagery request failed: {0}")]
    Service(#[from] ServiceError),
}

/// Errors from [`LampDetector::count_lamps`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    /// The detector service could not be reached or rejected the request.
    #[error("lamp detection failed: {0}")]
    Service(#[from] ServiceError),
    /// The image could not be processed by the detector.
    #[error("detector could not process image: {message}")]
    UnsupportedImage {
        /// Detector diagnostic.
        message: String,
    },
}

/// Fetch street-level imagery for a coordinate and heading.
///
/// `Ok(None)` means no imagery exists for the location, which is a normal
/// outcome rather than an error.
pub trait ImageryProvider: Send + Sync {
    /// Fetch the image at `point` looking towards `heading`.
    fn fetch_image(
        &self,
        point: Coordinate,
        heading: Heading,
    ) -> Result<Option<StreetImage>, ImageryError>;
}

/// Count street lamps visible in an image.
///
/// # Examples
///
/// ```
/// use saferoute_core::{DetectionError, LampDetector, StreetImage};
///
/// struct NonEmptyDetector;
///
/// impl LampDetector for NonEmptyDetector {
///     fn count_lamps(&self, image: &StreetImage) -> Result<u32, DetectionError> {
///         Ok(u32::from(!image.bytes.is_empty()))
///     }
/// }
///
/// assert_eq!(NonEmptyDetector.count_lamps(&StreetImage::new(vec![1]))?, 1);
/// # Ok::<(), DetectionError>(())
/// ```
pub trait LampDetector: Send + Sync {
    /// Return the number of lamp detections in `image`.
    fn count_lamps(&self, image: &StreetImage) -> Result<u32, DetectionError>;
}

/// Quick-mode lighting summary for a route.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightingProfile {
    /// `well_lit_points / points_sampled`, or `0.0` with no points.
    pub lighting_ratio: f64,
    /// Sampled points where at least one heading showed a lamp.
    pub well_lit_points: u32,
    /// Number of sampled points.
    pub points_sampled: u32,
}

/// Full-mode lighting report for a route.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightingReport {
    /// Lamp detections summed over every analysed image.
    pub lamp_count: u32,
    /// Images fetched and successfully analysed.
    pub images_analyzed: u32,
    /// Number of sampled points.
    pub points_sampled: u32,
    /// Sampled points where at least one heading showed a lamp.
    pub well_lit_points: u32,
    /// `well_lit_points / points_sampled`, or `0.0` with no points.
    pub lighting_ratio: f64,
    /// Mean detections per analysed image, or `0.0` with no images.
    pub lamp_density: f64,
}

/// Lighting estimation over a pair of collaborators.
///
/// # Examples
/// ```
/// use saferoute_core::{Coordinate, LightingEstimator};
/// use saferoute_core::test_support::{ByteCountDetector, StubImagery};
///
/// // Every image carries two lamps.
/// let imagery = StubImagery::new(|_, _| Some(2));
/// let detector = ByteCountDetector;
/// let estimator = LightingEstimator::new(&imagery, &detector);
///
/// let points = [Coordinate::new(51.5, -0.12), Coordinate::new(51.6, -0.13)];
/// assert_eq!(estimator.lighting_profile(&points).lighting_ratio, 1.0);
/// assert_eq!(estimator.lighting_report(&points).lamp_count, 16);
/// ```
#[derive(Clone, Copy)]
pub struct LightingEstimator<'a> {
    imagery: &'a dyn ImageryProvider,
    detector: &'a dyn LampDetector,
}

impl fmt::Debug for LightingEstimator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightingEstimator").finish_non_exhaustive()
    }
}

impl<'a> LightingEstimator<'a> {
    /// Combine an imagery source with a lamp detector.
    #[must_use]
    pub const fn new(imagery: &'a dyn ImageryProvider, detector: &'a dyn LampDetector) -> Self {
        Self { imagery, detector }
    }

    /// Lamp detections at `point` towards `heading`.
    ///
    /// Returns `None` when no image was analysed, either because none exists
    /// or because a collaborator failed.
    fn detections(&self, point: Coordinate, heading: Heading) -> Option<u32> {
        let image = match self.imagery.fetch_image(point, heading) {
            Ok(Some(image)) => image,
            Ok(None) => {
                log::debug!("no street imagery at {point} heading {heading}");
                return None;
            }
            Err(err) => {
                log::warn!("skipping heading {heading} at {point}: {err}");
                return None;
            }
        };
        self.detector
            .count_lamps(&image)
            .inspect_err(|err| log::warn!("skipping heading {heading} at {point}: {err}"))
            .ok()
    }

    /// Report whether any heading at `point` shows a street lamp.
    ///
    /// Headings are probed in [`Heading::PROBE_ORDER`] and probing stops at
    /// the first detection.
    #[must_use]
    pub fn probe_point(&self, point: Coordinate) -> bool {
        Heading::PROBE_ORDER
            .iter()
            .any(|&heading| self.detections(point, heading).is_some_and(|count| count > 0))
    }

    /// Quick-mode share of well-lit points.
    #[must_use]
    pub fn lighting_profile(&self, points: &[Coordinate]) -> LightingProfile {
        let points_sampled = saturating_count(points.len());
        let well_lit_points =
            saturating_count(points.iter().filter(|&&point| self.probe_point(point)).count());
        LightingProfile {
            lighting_ratio: ratio(well_lit_points, points_sampled),
            well_lit_points,
            points_sampled,
        }
    }

    /// Full-mode report probing every heading at every point.
    #[must_use]
    pub fn lighting_report(&self, points: &[Coordinate]) -> LightingReport {
        let mut report = LightingReport {
            points_sampled: saturating_count(points.len()),
            ..LightingReport::default()
        };
        for &point in points {
            let mut lit = false;
            for heading in Heading::PROBE_ORDER {
                let Some(count) = self.detections(point, heading) else {
                    continue;
                };
                report.images_analyzed = report.images_analyzed.saturating_add(1);
                report.lamp_count = report.lamp_count.saturating_add(count);
                lit |= count > 0;
            }
            report.well_lit_points = report.well_lit_points.saturating_add(u32::from(lit));
        }
        report.lighting_ratio = ratio(report.well_lit_points, report.points_sampled);
        report.lamp_density = ratio(report.lamp_count, report.images_analyzed);
        report
    }
}

/// Full-mode lighting report for an encoded route.
///
/// The route is decoded and down-sampled to at most `max_points` waypoints
/// before every heading at every waypoint is probed. No risk model is
/// involved.
///
/// # Errors
/// Returns [`GeometryDecodeError`] when `encoded_geometry` is malformed.
///
/// # Examples
/// ```
/// use saferoute_core::route_lighting_report;
/// use saferoute_core::test_support::{ByteCountDetector, StubImagery};
///
/// let imagery = StubImagery::new(|_, _| Some(1));
/// let report = route_lighting_report("_p~iF~ps|U_ulLnnqC", 8, &imagery, &ByteCountDetector)?;
/// assert_eq!(report.points_sampled, 2);
/// assert_eq!(report.lamp_count, 8);
/// # Ok::<(), saferoute_core::GeometryDecodeError>(())
/// ```
pub fn route_lighting_report(
    encoded_geometry: &str,
    max_points: usize,
    imagery: &dyn ImageryProvider,
    detector: &dyn LampDetector,
) -> Result<LightingReport, GeometryDecodeError> {
    let sample = sample_waypoints(encoded_geometry, max_points)?;
    Ok(LightingEstimator::new(imagery, detector).lighting_report(sample.points()))
}

fn saturating_count(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[expect(clippy::float_arithmetic, reason = "ratio of two counts")]
fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    f64::from(numerator) / f64::from(denominator)
}
