//! Facade crate for the SafeRoute route safety engine.
//!
//! This crate re-exports the core domain types and exposes the model loader
//! and the HTTP service adapters behind feature flags.

#![forbid(unsafe_code)]

pub use saferoute_core::{
    CentroidModel, ClusterId, ClusterModel, CombinedAssessment, CompositeScore, Coordinate,
    CrimeAssessment, DirectionsError, DirectionsProvider, DroppedCandidate, EngineConfig,
    GeocodeError, Geocoder, Hotspot, ImageryProvider, LampDetector, LightingReport, Location,
    PlanError, RiskLevel, RiskLookup, RiskTable, RouteCandidate, RouteSafetyEngine, ScoredRoute,
    ServiceError, TripPlanner,
};

#[cfg(feature = "model")]
pub use saferoute_model::{ArtefactPaths, ModelError, load_risk_lookup};

#[cfg(feature = "http")]
pub use saferoute_data::{
    GoogleDirectionsProvider, GoogleGeocoder, GoogleMapsConfig, HttpLampDetector,
    StreetViewImagery, TravelMode,
};
