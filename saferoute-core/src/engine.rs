//! Crime-only and combined route assessment flows.
//!
//! Both flows share the same front half: every candidate is sampled and its
//! risk aggregated exactly once. Candidates whose geometry cannot be decoded
//! are dropped from the request and reported alongside the result. The flows
//! then differ in how routes are classified, which detail hotspots carry,
//! and how the final selection is ordered.

use std::sync::Arc;

use crate::aggregate::{HotspotDetail, RiskProfile, assess_route_risk};
use crate::classify::{classify_by_rating, classify_by_risk};
use crate::composite::CompositeScore;
use crate::lighting::{
    ImageryProvider, LampDetector, LightingEstimator, LightingReport, route_lighting_report,
};
use crate::risk::{ClusterModel, RiskLookup};
use crate::route::{RouteCandidate, ScoredRoute};
use crate::sampler::{
    COMBINED_SAMPLE_POINTS, CRIME_SAMPLE_POINTS, GeometryDecodeError, WaypointSample,
    sample_waypoints,
};
use crate::select::{DEFAULT_SELECTION_CAP, Rankable, SelectionOrder, select_diverse};
use crate::{Hotspot, RiskLevel};

/// Tuning knobs for [`RouteSafetyEngine`].
///
/// # Examples
/// ```
/// use saferoute_core::EngineConfig;
///
/// let config = EngineConfig::default().with_selection_cap(2);
/// assert_eq!(config.selection_cap, 2);
/// assert_eq!(config.crime_sample_points, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Waypoints sampled per route in the crime-only flow.
    pub crime_sample_points: usize,
    /// Waypoints sampled per route in the combined flow.
    pub combined_sample_points: usize,
    /// Waypoints sampled for a standalone lighting report.
    pub report_sample_points: usize,
    /// Maximum number of routes returned by either flow.
    pub selection_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            crime_sample_points: CRIME_SAMPLE_POINTS,
            combined_sample_points: COMBINED_SAMPLE_POINTS,
            report_sample_points: COMBINED_SAMPLE_POINTS,
            selection_cap: DEFAULT_SELECTION_CAP,
        }
    }
}

impl EngineConfig {
    /// Set the crime-only sample size.
    #[must_use]
    pub const fn with_crime_sample_points(mut self, points: usize) -> Self {
        self.crime_sample_points = points;
        self
    }

    /// Set the combined-flow sample size.
    #[must_use]
    pub const fn with_combined_sample_points(mut self, points: usize) -> Self {
        self.combined_sample_points = points;
        self
    }

    /// Set the lighting report sample size.
    #[must_use]
    pub const fn with_report_sample_points(mut self, points: usize) -> Self {
        self.report_sample_points = points;
        self
    }

    /// Set the maximum number of routes returned.
    #[must_use]
    pub const fn with_selection_cap(mut self, cap: usize) -> Self {
        self.selection_cap = cap;
        self
    }
}

/// A candidate removed from a request because its geometry was malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DroppedCandidate {
    /// One-based position of the candidate in the request.
    pub id: usize,
    /// Decoder diagnostic.
    pub reason: String,
}

/// Result of the crime-only flow.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrimeAssessment {
    /// First selected route, absent when no candidate survived.
    pub recommended: Option<ScoredRoute>,
    /// Remaining selected routes in selection order.
    pub alternatives: Vec<ScoredRoute>,
    /// Hotspots of the recommended route.
    pub hotspots: Vec<Hotspot>,
    /// Candidates dropped for malformed geometry.
    pub dropped: Vec<DroppedCandidate>,
}

/// Result of the combined crime and lighting flow.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombinedAssessment {
    /// Selected routes, highest safety rating first.
    pub routes: Vec<ScoredRoute>,
    /// Candidates dropped for malformed geometry.
    pub dropped: Vec<DroppedCandidate>,
}

struct Assessed<'c> {
    id: usize,
    candidate: &'c RouteCandidate,
    sample: WaypointSample,
    profile: RiskProfile,
}

struct Ranked {
    route: ScoredRoute,
    profile: RiskProfile,
}

impl Rankable for Ranked {
    fn risk_level(&self) -> RiskLevel {
        self.route.risk_level
    }

    fn mean_risk(&self) -> f64 {
        self.route.mean_risk
    }
}

impl Ranked {
    fn new(assessed: &Assessed<'_>, risk_level: RiskLevel) -> Self {
        Self {
            route: ScoredRoute {
                id: assessed.id,
                distance_km: assessed.candidate.distance_km(),
                duration_min: assessed.candidate.duration_min(),
                mean_risk: assessed.profile.mean_risk(),
                lighting_ratio: None,
                safety_rating: None,
                risk_level,
                hotspots: Vec::new(),
                encoded_geometry: assessed.candidate.encoded_geometry().to_owned(),
            },
            profile: assessed.profile.clone(),
        }
    }

    fn into_route(self, detail: HotspotDetail) -> ScoredRoute {
        ScoredRoute {
            hotspots: self.profile.hotspots(detail),
            ..self.route
        }
    }
}

/// Scores candidate routes against a shared risk model.
///
/// The engine is cheap to clone; clones share the same model and table.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use saferoute_core::{RouteCandidate, RouteSafetyEngine};
/// use saferoute_core::test_support::{banded_lookup, encode_points, point_in_band};
///
/// let engine = RouteSafetyEngine::new(Arc::new(banded_lookup()));
/// let safe = encode_points(&[point_in_band(0), point_in_band(0)]);
/// let risky = encode_points(&[point_in_band(2), point_in_band(2)]);
/// let candidates = vec![
///     RouteCandidate::new(risky, 2.0, 10.0)?,
///     RouteCandidate::new(safe, 3.0, 14.0)?,
/// ];
///
/// let assessment = engine.assess_crime(&candidates);
/// assert_eq!(assessment.recommended.map(|route| route.id), Some(2));
/// # Ok::<(), saferoute_core::RouteCandidateError>(())
/// ```
#[derive(Debug)]
pub struct RouteSafetyEngine<M> {
    lookup: Arc<RiskLookup<M>>,
    config: EngineConfig,
}

impl<M> Clone for RouteSafetyEngine<M> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
            config: self.config,
        }
    }
}

impl<M: ClusterModel> RouteSafetyEngine<M> {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new(lookup: Arc<RiskLookup<M>>) -> Self {
        Self::with_config(lookup, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration.
    #[must_use]
    pub const fn with_config(lookup: Arc<RiskLookup<M>>, config: EngineConfig) -> Self {
        Self { lookup, config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared risk lookup.
    #[must_use]
    pub const fn lookup(&self) -> &Arc<RiskLookup<M>> {
        &self.lookup
    }

    fn assess_candidates<'c>(
        &self,
        candidates: &'c [RouteCandidate],
        max_points: usize,
    ) -> (Vec<Assessed<'c>>, Vec<DroppedCandidate>) {
        let mut assessed = Vec::with_capacity(candidates.len());
        let mut dropped = Vec::new();
        for (id, candidate) in (1..).zip(candidates) {
            match sample_waypoints(candidate.encoded_geometry(), max_points) {
                Ok(sample) => {
                    let profile = assess_route_risk(&self.lookup, &sample);
                    assessed.push(Assessed {
                        id,
                        candidate,
                        sample,
                        profile,
                    });
                }
                Err(err) => {
                    log::warn!("dropping route {id}: {err}");
                    dropped.push(DroppedCandidate {
                        id,
                        reason: err.message,
                    });
                }
            }
        }
        (assessed, dropped)
    }

    /// Score candidates on crime risk alone.
    ///
    /// Routes are banded by mean risk, one representative per band is kept,
    /// and hotspots carry cluster ids. The first selected route is the
    /// recommendation.
    #[must_use]
    pub fn assess_crime(&self, candidates: &[RouteCandidate]) -> CrimeAssessment {
        let (assessed, dropped) =
            self.assess_candidates(candidates, self.config.crime_sample_points);
        let risks: Vec<f64> = assessed.iter().map(|a| a.profile.mean_risk()).collect();
        let ranked: Vec<Ranked> = assessed
            .iter()
            .zip(classify_by_risk(&risks))
            .map(|(a, level)| Ranked::new(a, level))
            .collect();

        let mut selected = select_diverse(ranked, self.config.selection_cap)
            .into_iter()
            .map(|ranked| ranked.into_route(HotspotDetail::WithCluster));
        let recommended = selected.next();
        let alternatives: Vec<ScoredRoute> = selected.collect();
        let hotspots = recommended
            .as_ref()
            .map(|route| route.hotspots.clone())
            .unwrap_or_default();
        log::debug!(
            "crime assessment kept {} of {} candidates",
            usize::from(recommended.is_some()).saturating_add(alternatives.len()),
            candidates.len()
        );

        CrimeAssessment {
            recommended,
            alternatives,
            hotspots,
            dropped,
        }
    }

    /// Score candidates on crime risk and street lighting together.
    ///
    /// Each surviving candidate is probed for lighting in quick mode, rated,
    /// banded by rating, and the selection is returned highest rating first.
    #[must_use]
    pub fn assess_combined(
        &self,
        candidates: &[RouteCandidate],
        imagery: &dyn ImageryProvider,
        detector: &dyn LampDetector,
    ) -> CombinedAssessment {
        let estimator = LightingEstimator::new(imagery, detector);
        let (assessed, dropped) =
            self.assess_candidates(candidates, self.config.combined_sample_points);
        let scores: Vec<(f64, CompositeScore)> = assessed
            .iter()
            .map(|a| {
                let lighting = estimator.lighting_profile(a.sample.points());
                let score = CompositeScore::new(a.profile.mean_risk(), lighting.lighting_ratio);
                (lighting.lighting_ratio, score)
            })
            .collect();
        let ratings: Vec<f64> = scores.iter().map(|(_, score)| score.rating).collect();
        let ranked: Vec<Ranked> = assessed
            .iter()
            .zip(&scores)
            .zip(classify_by_rating(&ratings))
            .map(|((a, &(lighting_ratio, score)), level)| {
                let mut ranked = Ranked::new(a, level);
                ranked.route.lighting_ratio = Some(lighting_ratio);
                ranked.route.safety_rating = Some(score.rating);
                ranked
            })
            .collect();

        let mut routes: Vec<ScoredRoute> = select_diverse(ranked, self.config.selection_cap)
            .into_iter()
            .map(|ranked| ranked.into_route(HotspotDetail::LocationOnly))
            .collect();
        SelectionOrder::SafetyRatingDescending.apply(&mut routes);
        log::debug!(
            "combined assessment kept {} of {} candidates",
            routes.len(),
            candidates.len()
        );

        CombinedAssessment { routes, dropped }
    }

    /// Full-detail lighting report for one route.
    ///
    /// # Errors
    /// Returns [`GeometryDecodeError`] when `encoded_geometry` is malformed.
    pub fn lighting_report(
        &self,
        encoded_geometry: &str,
        imagery: &dyn ImageryProvider,
        detector: &dyn LampDetector,
    ) -> Result<LightingReport, GeometryDecodeError> {
        route_lighting_report(
            encoded_geometry,
            self.config.report_sample_points,
            imagery,
            detector,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        ByteCountDetector, StubImagery, banded_lookup, encode_points, point_in_band,
    };
    use crate::{CentroidModel, ClusterId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn engine() -> RouteSafetyEngine<CentroidModel> {
        RouteSafetyEngine::new(Arc::new(banded_lookup()))
    }

    fn route_through(bands: &[u32]) -> RouteCandidate {
        let points: Vec<_> = bands.iter().map(|&band| point_in_band(band)).collect();
        RouteCandidate::new(encode_points(&points), 1.0, 5.0).expect("valid candidate")
    }

    #[rstest]
    fn crime_flow_recommends_lowest_band(engine: RouteSafetyEngine<CentroidModel>) {
        let candidates = vec![
            route_through(&[2, 2, 2]),
            route_through(&[0, 0, 0]),
            route_through(&[1, 1, 1]),
        ];

        let assessment = engine.assess_crime(&candidates);

        let recommended = assessment.recommended.expect("a route is recommended");
        assert_eq!(recommended.id, 2);
        assert_eq!(recommended.risk_level, RiskLevel::Low);
        let alternative_ids: Vec<usize> = assessment.alternatives.iter().map(|r| r.id).collect();
        assert_eq!(alternative_ids, vec![3, 1]);
        assert!(assessment.hotspots.is_empty());
    }

    #[rstest]
    fn crime_hotspots_carry_cluster_ids(engine: RouteSafetyEngine<CentroidModel>) {
        let candidates = vec![route_through(&[0, 2, 0])];

        let assessment = engine.assess_crime(&candidates);

        assert_eq!(assessment.hotspots.len(), 1);
        assert_eq!(
            assessment.hotspots.first().and_then(|h| h.cluster),
            Some(ClusterId(2))
        );
    }

    #[rstest]
    fn malformed_candidates_are_dropped(engine: RouteSafetyEngine<CentroidModel>) {
        let candidates = vec![
            RouteCandidate::new("   ", 1.0, 1.0).expect("valid numbers"),
            route_through(&[0, 0]),
        ];

        let assessment = engine.assess_crime(&candidates);

        assert_eq!(assessment.recommended.map(|r| r.id), Some(2));
        assert_eq!(assessment.dropped.len(), 1);
        assert_eq!(assessment.dropped.first().map(|d| d.id), Some(1));
    }

    #[rstest]
    fn no_candidates_yield_empty_assessment(engine: RouteSafetyEngine<CentroidModel>) {
        assert_eq!(engine.assess_crime(&[]), CrimeAssessment::default());
    }

    #[rstest]
    fn combined_flow_orders_by_rating(engine: RouteSafetyEngine<CentroidModel>) {
        let candidates = vec![
            route_through(&[1, 1]),
            route_through(&[2, 2]),
            route_through(&[0, 0]),
        ];
        // Lamps only around the low-risk cluster.
        let imagery = StubImagery::new(|point, _| Some(u8::from(point.lat < 5.0)));

        let assessment = engine.assess_combined(&candidates, &imagery, &ByteCountDetector);

        let ids: Vec<usize> = assessment.routes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        let safest = assessment.routes.first().expect("three routes");
        assert_eq!(safest.lighting_ratio, Some(1.0));
        assert_eq!(safest.safety_rating, Some(4.7));
        assert_eq!(safest.risk_level, RiskLevel::Low);
    }

    #[rstest]
    fn combined_hotspots_omit_cluster_ids(engine: RouteSafetyEngine<CentroidModel>) {
        let imagery = StubImagery::new(|_, _| None);

        let assessment =
            engine.assess_combined(&[route_through(&[2, 2])], &imagery, &ByteCountDetector);

        let route = assessment.routes.first().expect("one route");
        assert_eq!(route.hotspots.len(), 2);
        assert!(route.hotspots.iter().all(|h| h.cluster.is_none()));
    }

    #[rstest]
    fn lighting_report_uses_report_sample_size() {
        let engine = RouteSafetyEngine::with_config(
            Arc::new(banded_lookup()),
            EngineConfig::default().with_report_sample_points(2),
        );
        let imagery = StubImagery::new(|_, _| Some(1));
        let geometry = encode_points(&[point_in_band(0), point_in_band(1), point_in_band(2)]);

        let report = engine
            .lighting_report(&geometry, &imagery, &ByteCountDetector)
            .expect("valid geometry");

        assert_eq!(report.points_sampled, 2);
        assert_eq!(report.images_analyzed, 8);
    }

    #[rstest]
    fn lighting_report_rejects_malformed_geometry(engine: RouteSafetyEngine<CentroidModel>) {
        let imagery = StubImagery::new(|_, _| Some(1));
        assert!(engine.lighting_report("   ", &imagery, &ByteCountDetector).is_err());
    }
}
