//! Reduce per-point risks to a per-route risk profile.

use crate::risk::{ClusterId, ClusterModel, PointRisk, RiskLookup};
use crate::{Coordinate, WaypointSample};

/// Point risk above which a sampled location is reported as a hotspot.
///
/// The comparison is strict: a point at exactly this risk is not a hotspot.
pub const HIGH_RISK_THRESHOLD: f64 = 0.53;

/// How much detail [`RiskProfile::hotspots`] attaches to each hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotDetail {
    /// Include the cluster id of each hotspot.
    WithCluster,
    /// Report location and risk only.
    LocationOnly,
}

/// Sampled location whose risk exceeds [`HIGH_RISK_THRESHOLD`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hotspot {
    /// Sampled coordinate.
    pub location: Coordinate,
    /// Risk of the coordinate's cluster.
    pub risk: f64,
    /// Cluster id, present only when requested.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub cluster: Option<ClusterId>,
}

/// Crime-risk summary of one route.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RiskProfile {
    point_risks: Vec<PointRisk>,
    mean_risk: f64,
}

impl RiskProfile {
    /// Arithmetic mean of the sampled point risks, `0.0` for no samples.
    #[must_use]
    pub const fn mean_risk(&self) -> f64 {
        self.mean_risk
    }

    /// Risk of every sampled point, in sample order.
    #[must_use]
    pub const fn point_risks(&self) -> &[PointRisk] {
        self.point_risks.as_slice()
    }

    /// Cluster assigned to each sampled point, indexed by sample position.
    #[must_use]
    pub fn cluster_assignments(&self) -> Vec<ClusterId> {
        self.point_risks.iter().map(|point| point.cluster).collect()
    }

    /// Sampled points with risk strictly above [`HIGH_RISK_THRESHOLD`], in
    /// sample order.
    #[must_use]
    pub fn hotspots(&self, detail: HotspotDetail) -> Vec<Hotspot> {
        self.point_risks
            .iter()
            .filter(|point| point.risk > HIGH_RISK_THRESHOLD)
            .map(|point| Hotspot {
                location: point.location,
                risk: point.risk,
                cluster: match detail {
                    HotspotDetail::WithCluster => Some(point.cluster),
                    HotspotDetail::LocationOnly => None,
                },
            })
            .collect()
    }
}

/// Look up the risk of every sampled point and summarise the route.
///
/// Each point is looked up exactly once; both the mean and the hotspots are
/// derived from the same lookups.
///
/// # Examples
/// ```
/// use saferoute_core::{
///     CentroidModel, ClusterId, Coordinate, HotspotDetail, RiskLookup, RiskTable,
///     WaypointSample, assess_route_risk,
/// };
///
/// let model = CentroidModel::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 0.0)])?;
/// let table = RiskTable::from_iter([(ClusterId(0), 0.2), (ClusterId(1), 0.8)]);
/// let lookup = RiskLookup::new(model, table);
///
/// let sample = WaypointSample::from_points(&[Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 0.0)], 5);
/// let profile = assess_route_risk(&lookup, &sample);
///
/// assert!((profile.mean_risk() - 0.5).abs() < 1e-12);
/// assert_eq!(profile.hotspots(HotspotDetail::WithCluster).len(), 1);
/// # Ok::<(), saferoute_core::CentroidModelError>(())
/// ```
#[must_use]
pub fn assess_route_risk<M: ClusterModel>(
    lookup: &RiskLookup<M>,
    sample: &WaypointSample,
) -> RiskProfile {
    let point_risks: Vec<PointRisk> = sample.iter().map(|&point| lookup.lookup(point)).collect();
    let mean_risk = mean(point_risks.iter().map(|point| point.risk));
    RiskProfile {
        point_risks,
        mean_risk,
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "arithmetic mean of a short sample"
)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_usize), |(total, seen), value| {
        (total + value, seen.saturating_add(1))
    });
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}
