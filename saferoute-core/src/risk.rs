//! Map coordinates to geospatial clusters and look up their crime risk.
//!
//! The cluster model and the risk table are produced offline and loaded once
//! at start-up. Both are read-only for the lifetime of the process, so a
//! [`RiskLookup`] is shared between requests behind an `Arc` without locking.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use thiserror::Error;

use crate::Coordinate;

/// Identifier of a precomputed geospatial cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClusterId(pub u32);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Assign a coordinate to a cluster of a pretrained partitioning model.
///
/// Implementations must be deterministic: identical coordinates always map
/// to the same cluster. They are shared across threads, hence `Send + Sync`.
///
/// # Examples
///
/// ```rust
/// use saferoute_core::{ClusterId, ClusterModel, Coordinate};
///
/// struct Hemispheres;
///
/// impl ClusterModel for Hemispheres {
///     fn predict(&self, point: Coordinate) -> ClusterId {
///         if point.lat >= 0.0 { ClusterId(0) } else { ClusterId(1) }
///     }
/// }
///
/// assert_eq!(Hemispheres.predict(Coordinate::new(-33.9, 18.4)), ClusterId(1));
/// ```
pub trait ClusterModel: Send + Sync {
    /// Return the cluster containing `point`.
    fn predict(&self, point: Coordinate) -> ClusterId;
}

impl<M: ClusterModel + ?Sized> ClusterModel for Arc<M> {
    fn predict(&self, point: Coordinate) -> ClusterId {
        (**self).predict(point)
    }
}

impl<M: ClusterModel + ?Sized> ClusterModel for Box<M> {
    fn predict(&self, point: Coordinate) -> ClusterId {
        (**self).predict(point)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Centroid {
    id: ClusterId,
    position: [f64; 2],
}

impl RTreeObject for Centroid {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for Centroid {
    #[expect(
        clippy::float_arithmetic,
        reason = "squared Euclidean distance in feature space"
    )]
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let [lat, lng] = self.position;
        let [query_lat, query_lng] = *point;
        let d_lat = lat - query_lat;
        let d_lng = lng - query_lng;
        d_lat.mul_add(d_lat, d_lng * d_lng)
    }
}

/// Errors returned by [`CentroidModel::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CentroidModelError {
    /// No centroids were supplied.
    #[error("cluster model must contain at least one centroid")]
    Empty,
    /// A centroid had a non-finite component.
    #[error("centroid {index} has a non-finite component")]
    NonFinite {
        /// Position of the offending centroid.
        index: usize,
    },
    /// More centroids were supplied than cluster ids can represent.
    #[error("cluster model has too many centroids ({count})")]
    TooMany {
        /// Number of centroids supplied.
        count: usize,
    },
}

/// Nearest-centroid (k-means) partitioning over the `(lat, lng)` plane.
///
/// Cluster ids are the centroid positions in the input order. Equidistant
/// centroids resolve to the lowest id, matching k-means prediction.
///
/// # Examples
/// ```
/// use saferoute_core::{CentroidModel, ClusterId, ClusterModel, Coordinate};
///
/// let model = CentroidModel::new(vec![
///     Coordinate::new(51.50, -0.12),
///     Coordinate::new(51.55, -0.05),
/// ])?;
/// assert_eq!(model.predict(Coordinate::new(51.54, -0.06)), ClusterId(1));
/// # Ok::<(), saferoute_core::CentroidModelError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CentroidModel {
    tree: RTree<Centroid>,
}

impl CentroidModel {
    /// Build the model from centroids ordered by cluster id.
    ///
    /// # Errors
    /// Returns [`CentroidModelError`] when the list is empty, too long, or
    /// contains non-finite coordinates.
    pub fn new(centroids: Vec<Coordinate>) -> Result<Self, CentroidModelError> {
        if centroids.is_empty() {
            return Err(CentroidModelError::Empty);
        }
        let count = centroids.len();
        let entries = centroids
            .into_iter()
            .enumerate()
            .map(|(index, centroid)| {
                if !(centroid.lat.is_finite() && centroid.lng.is_finite()) {
                    return Err(CentroidModelError::NonFinite { index });
                }
                let id = u32::try_from(index).map_err(|_| CentroidModelError::TooMany { count })?;
                Ok(Centroid {
                    id: ClusterId(id),
                    position: centroid.as_feature(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            tree: RTree::bulk_load(entries),
        })
    }

    /// Number of clusters in the model.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Report whether the model has no clusters.
    ///
    /// Always `false` for models built through [`CentroidModel::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl ClusterModel for CentroidModel {
    fn predict(&self, point: Coordinate) -> ClusterId {
        let query = point.as_feature();
        let mut nearest = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let Some((first, best_distance)) = nearest.next() else {
            return ClusterId::default();
        };
        nearest
            .take_while(|(_, distance)| distance.total_cmp(&best_distance).is_eq())
            .map(|(centroid, _)| centroid.id)
            .fold(first.id, Ord::min)
    }
}

/// Precomputed risk per cluster.
///
/// Clusters absent from the table resolve to a neutral risk of `0.0`; this
/// is the no-data policy, not an error. Values are conventionally within
/// `0.0..=1.0` but the table does not enforce it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RiskTable {
    risks: BTreeMap<ClusterId, f64>,
}

impl RiskTable {
    /// Wrap a precomputed cluster-to-risk mapping.
    #[must_use]
    pub const fn new(risks: BTreeMap<ClusterId, f64>) -> Self {
        Self { risks }
    }

    /// Risk for `cluster`, or `0.0` when the cluster has no entry.
    #[must_use]
    pub fn risk(&self, cluster: ClusterId) -> f64 {
        self.risks.get(&cluster).copied().unwrap_or(0.0)
    }

    /// Number of clusters with a recorded risk.
    #[must_use]
    pub fn len(&self) -> usize {
        self.risks.len()
    }

    /// Report whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.risks.is_empty()
    }

    /// Iterate over recorded risks in cluster order.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, f64)> + '_ {
        self.risks.iter().map(|(cluster, risk)| (*cluster, *risk))
    }
}

impl FromIterator<(ClusterId, f64)> for RiskTable {
    fn from_iter<I: IntoIterator<Item = (ClusterId, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Risk looked up for a single sampled coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointRisk {
    /// Sampled coordinate.
    pub location: Coordinate,
    /// Cluster the coordinate belongs to.
    pub cluster: ClusterId,
    /// Risk of that cluster.
    pub risk: f64,
}

/// Read-only pairing of a cluster model with its risk table.
///
/// # Examples
/// ```
/// use saferoute_core::{CentroidModel, ClusterId, Coordinate, RiskLookup, RiskTable};
///
/// let model = CentroidModel::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)])?;
/// let table = RiskTable::from_iter([(ClusterId(0), 0.8)]);
/// let lookup = RiskLookup::new(model, table);
///
/// assert_eq!(lookup.lookup(Coordinate::new(0.1, 0.1)).risk, 0.8);
/// assert_eq!(lookup.lookup(Coordinate::new(0.9, 0.9)).risk, 0.0);
/// # Ok::<(), saferoute_core::CentroidModelError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RiskLookup<M> {
    model: M,
    table: RiskTable,
}

impl<M: ClusterModel> RiskLookup<M> {
    /// Pair a cluster model with its risk table.
    #[must_use]
    pub const fn new(model: M, table: RiskTable) -> Self {
        Self { model, table }
    }

    /// Cluster and risk for `point`.
    #[must_use]
    pub fn lookup(&self, point: Coordinate) -> PointRisk {
        let cluster = self.model.predict(point);
        PointRisk {
            location: point,
            cluster,
            risk: self.table.risk(cluster),
        }
    }

    /// Underlying cluster model.
    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Underlying risk table.
    #[must_use]
    pub const fn table(&self) -> &RiskTable {
        &self.table
    }
}
