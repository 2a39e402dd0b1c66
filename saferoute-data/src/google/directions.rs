//! `DirectionsProvider` backed by the Google Directions API.

use saferoute_core::{Coordinate, DirectionsError, DirectionsProvider, RouteCandidate};
use url::Url;

use super::GoogleMapsConfig;
use super::types::DirectionsResponse;
use crate::http::{HttpBridge, ProviderBuildError, endpoint, redact};

const DIRECTIONS_PATH: &str = "maps/api/directions/json";

/// Directions provider requesting alternative routes between coordinates.
///
/// Every request sets `alternatives=true` so the engine has several
/// candidates to diversify over. The travel mode comes from
/// [`GoogleMapsConfig::travel_mode`].
#[derive(Debug)]
pub struct GoogleDirectionsProvider {
    bridge: HttpBridge,
    config: GoogleMapsConfig,
    endpoint: Url,
}

impl GoogleDirectionsProvider {
    /// Create a provider for the public endpoint with `api_key`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(GoogleMapsConfig::new(api_key))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: GoogleMapsConfig) -> Result<Self, ProviderBuildError> {
        let endpoint = endpoint(&config.base_url, DIRECTIONS_PATH)?;
        let bridge = HttpBridge::new(&config.user_agent, config.timeout)?;
        Ok(Self {
            bridge,
            config,
            endpoint,
        })
    }

    fn build_url(&self, origin: Coordinate, destination: Coordinate) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("origin", &origin.to_string())
            .append_pair("destination", &destination.to_string())
            .append_pair("alternatives", "true")
            .append_pair("mode", self.config.travel_mode.as_str())
            .append_pair("key", &self.config.api_key);
        url
    }

    async fn fetch_async(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<RouteCandidate>, DirectionsError> {
        let url = self.build_url(origin, destination);
        log::debug!("requesting directions: {}", redact(&url));
        let response: DirectionsResponse = self.bridge.get_json(&url).await?;
        response.into_candidates(origin, destination)
    }
}

impl DirectionsProvider for GoogleDirectionsProvider {
    fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<RouteCandidate>, DirectionsError> {
        self.bridge.block_on(self.fetch_async(origin, destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::TravelMode;
    use rstest::rstest;

    #[rstest]
    fn build_url_requests_alternatives() {
        let config = GoogleMapsConfig::new("secret")
            .with_base_url("http://maps.test/")
            .with_travel_mode(TravelMode::Walking);
        let provider = GoogleDirectionsProvider::with_config(config).expect("provider should build");

        let url = provider.build_url(Coordinate::new(51.5, -0.12), Coordinate::new(51.6, -0.02));

        assert_eq!(
            url.as_str(),
            "http://maps.test/maps/api/directions/json?origin=51.5%2C-0.12\
             &destination=51.6%2C-0.02&alternatives=true&mode=walking&key=secret"
        );
    }

    #[rstest]
    fn defaults_to_driving() {
        let provider = GoogleDirectionsProvider::new("secret").expect("provider should build");
        let url = provider.build_url(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0));
        assert!(url.as_str().starts_with("https://maps.googleapis.com/maps/api/directions/json?"));
        assert!(url.query_pairs().any(|(name, value)| name == "mode" && value == "driving"));
    }
}
