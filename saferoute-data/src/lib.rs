//! HTTP adapters for the SafeRoute engine's external collaborators.
//!
//! Responsibilities:
//! - Implement the collaborator traits from `saferoute-core` against the
//!   Google Maps web services and a remote lamp detector.
//! - Translate transport and protocol failures into the core error types.
//!
//! Boundaries:
//! - Do not encode scoring rules (live in `saferoute-core`).
//! - Never log or report API keys; URLs are redacted before leaving an
//!   adapter.
//!
//! Invariants:
//! - Adapters are `Send + Sync` and hold no mutable state.
//! - Each adapter owns its HTTP client and Tokio runtime.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod detector;
pub mod google;
mod http;

pub use detector::{DEFAULT_DETECTOR_URL, DetectorConfig, HttpLampDetector};
pub use google::{
    DEFAULT_GOOGLE_BASE_URL, GoogleDirectionsProvider, GoogleGeocoder, GoogleMapsConfig,
    ParseTravelModeError, StreetViewImagery, TravelMode,
};
pub use http::{DEFAULT_USER_AGENT, ProviderBuildError};
