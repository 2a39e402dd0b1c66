//! Google Maps Platform adapters.
//!
//! Three adapters share one [`GoogleMapsConfig`]:
//!
//! - [`GoogleDirectionsProvider`] requests alternative routes from the
//!   Directions API;
//! - [`GoogleGeocoder`] resolves addresses through the Geocoding API;
//! - [`StreetViewImagery`] fetches Street View Static API images.
//!
//! The API key travels as the `key` query parameter and is redacted from
//! every URL that appears in an error or log line.
//!
//! # Example
//!
//! ```no_run
//! use saferoute_core::{Coordinate, DirectionsProvider};
//! use saferoute_data::google::{GoogleDirectionsProvider, GoogleMapsConfig, TravelMode};
//!
//! let config = GoogleMapsConfig::new("api-key").with_travel_mode(TravelMode::Walking);
//! let provider = GoogleDirectionsProvider::with_config(config)?;
//! let routes = provider.directions(
//!     Coordinate::new(51.5007, -0.1246),
//!     Coordinate::new(51.5081, -0.0759),
//! )?;
//! println!("{} candidate routes", routes.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod directions;
mod geocoding;
mod streetview;
pub mod types;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

pub use directions::GoogleDirectionsProvider;
pub use geocoding::GoogleGeocoder;
pub use streetview::StreetViewImagery;

/// Root of the Google Maps Platform web services.
pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://maps.googleapis.com";

/// Travel mode requested from the Directions API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// Road network for cars.
    #[default]
    Driving,
    /// Pedestrian paths and sidewalks.
    Walking,
    /// Bicycle paths and preferred streets.
    Bicycling,
    /// Public transit routes.
    Transit,
}

impl TravelMode {
    /// Value of the `mode` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown travel mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel mode {value:?}; expected driving, walking, bicycling or transit")]
pub struct ParseTravelModeError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for TravelMode {
    type Err = ParseTravelModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "driving" => Ok(Self::Driving),
            "walking" => Ok(Self::Walking),
            "bicycling" => Ok(Self::Bicycling),
            "transit" => Ok(Self::Transit),
            _ => Err(ParseTravelModeError {
                value: value.to_owned(),
            }),
        }
    }
}

/// Configuration shared by the Google adapters.
#[derive(Clone)]
pub struct GoogleMapsConfig {
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Service root, e.g. [`DEFAULT_GOOGLE_BASE_URL`].
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Travel mode for directions requests.
    pub travel_mode: TravelMode,
}

impl fmt::Debug for GoogleMapsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleMapsConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("travel_mode", &self.travel_mode)
            .finish()
    }
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GOOGLE_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            travel_mode: TravelMode::default(),
        }
    }
}

impl GoogleMapsConfig {
    /// Create a configuration for the public endpoint with `api_key`.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Point the adapters at another service root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the travel mode for directions requests.
    #[must_use]
    pub const fn with_travel_mode(mut self, travel_mode: TravelMode) -> Self {
        self.travel_mode = travel_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn config_builder_pattern() {
        let config = GoogleMapsConfig::new("secret")
            .with_base_url("http://maps.test")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent/1.0")
            .with_travel_mode(TravelMode::Walking);

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, "http://maps.test");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.travel_mode, TravelMode::Walking);
    }

    #[rstest]
    fn debug_output_hides_api_key() {
        let rendered = format!("{:?}", GoogleMapsConfig::new("secret"));
        assert!(!rendered.contains("secret"));
    }

    #[rstest]
    #[case("driving", TravelMode::Driving)]
    #[case(" Walking ", TravelMode::Walking)]
    #[case("BICYCLING", TravelMode::Bicycling)]
    #[case("transit", TravelMode::Transit)]
    fn parses_travel_modes(#[case] input: &str, #[case] expected: TravelMode) {
        assert_eq!(input.parse::<TravelMode>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_travel_mode() {
        assert!("hovercraft".parse::<TravelMode>().is_err());
    }
}
