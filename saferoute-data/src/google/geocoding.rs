//! `Geocoder` backed by the Google Geocoding API.

use saferoute_core::{Coordinate, GeocodeError, Geocoder};
use url::Url;

use super::GoogleMapsConfig;
use super::types::GeocodeResponse;
use crate::http::{HttpBridge, ProviderBuildError, endpoint};

const GEOCODE_PATH: &str = "maps/api/geocode/json";

/// Geocoder resolving free-text addresses to their best match.
#[derive(Debug)]
pub struct GoogleGeocoder {
    bridge: HttpBridge,
    config: GoogleMapsConfig,
    endpoint: Url,
}

impl GoogleGeocoder {
    /// Create a geocoder for the public endpoint with `api_key`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(GoogleMapsConfig::new(api_key))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: GoogleMapsConfig) -> Result<Self, ProviderBuildError> {
        let endpoint = endpoint(&config.base_url, GEOCODE_PATH)?;
        let bridge = HttpBridge::new(&config.user_agent, config.timeout)?;
        Ok(Self {
            bridge,
            config,
            endpoint,
        })
    }

    fn build_url(&self, address: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.config.api_key);
        url
    }

    async fn geocode_async(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let url = self.build_url(address);
        let response: GeocodeResponse = self.bridge.get_json(&url).await?;
        response.into_coordinate(address)
    }
}

impl Geocoder for GoogleGeocoder {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        self.bridge.block_on(self.geocode_async(address))
    }
}
