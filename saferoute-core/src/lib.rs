//! Core domain types and scoring logic for the SafeRoute engine.
//!
//! The crate turns a set of candidate routes between two points into a small,
//! risk-diverse selection. The pipeline runs leaf components first:
//!
//! - [`sampler`] decodes encoded route geometry and down-samples it.
//! - [`risk`] maps each sampled coordinate to a cluster and its risk value.
//! - [`lighting`] probes street-level imagery for detected street lamps.
//! - [`aggregate`] reduces per-point risks to a mean and a set of hotspots.
//! - [`composite`] blends crime risk and lighting into a 0 to 5 rating.
//! - [`classify`] assigns relative Low/Medium/High bands per request.
//! - [`select`] keeps one representative per band and fills up to a cap.
//!
//! [`RouteSafetyEngine`] wires these together into the crime-only and the
//! combined flows, and [`TripPlanner`] resolves addresses and fetches
//! candidates through the external collaborators first.
//!
//! Everything here is synchronous and free of I/O; collaborators that talk to
//! the network live behind the traits in [`lighting`] and [`directions`].

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod aggregate;
pub mod classify;
pub mod composite;
pub mod coordinate;
pub mod directions;
pub mod engine;
pub mod lighting;
pub mod planner;
pub mod risk;
pub mod route;
pub mod sampler;
pub mod select;
pub mod service;

#[doc(hidden)]
pub mod test_support;

pub use aggregate::{HIGH_RISK_THRESHOLD, Hotspot, HotspotDetail, RiskProfile, assess_route_risk};
pub use classify::{RiskLevel, classify_by_rating, classify_by_risk};
pub use composite::{CompositeScore, combined_score, safety_rating};
pub use coordinate::Coordinate;
pub use directions::{DirectionsError, DirectionsProvider, GeocodeError, Geocoder};
pub use engine::{
    CombinedAssessment, CrimeAssessment, DroppedCandidate, EngineConfig, RouteSafetyEngine,
};
pub use lighting::{
    DetectionError, Heading, ImageryError, ImageryProvider, LampDetector, LightingEstimator,
    LightingProfile, LightingReport, StreetImage, route_lighting_report,
};
pub use planner::{
    Location, LocationParseError, PlanError, TripPlanner, fetch_candidates, resolve_location,
    trip_lighting_report,
};
pub use risk::{
    CentroidModel, CentroidModelError, ClusterId, ClusterModel, PointRisk, RiskLookup, RiskTable,
};
pub use route::{RouteCandidate, RouteCandidateError, ScoredRoute};
pub use sampler::{GeometryDecodeError, WaypointSample, decode_geometry, sample_waypoints};
pub use select::{DEFAULT_SELECTION_CAP, Rankable, SelectionOrder, select_diverse};
pub use service::ServiceError;
