//! `ImageryProvider` backed by the Street View Static API.

use reqwest::header::CONTENT_TYPE;
use saferoute_core::{Coordinate, Heading, ImageryError, ImageryProvider, ServiceError, StreetImage};
use url::Url;

use super::GoogleMapsConfig;
use crate::http::{HttpBridge, ProviderBuildError, endpoint, redact};

const STREETVIEW_PATH: &str = "maps/api/streetview";
const IMAGE_SIZE: &str = "640x640";
const FIELD_OF_VIEW: &str = "90";
const PITCH: &str = "0";

/// Street-level imagery at a fixed 640x640 size, 90 degree field of view
/// and level pitch.
///
/// A non-success HTTP status means no imagery is available for the
/// location and heading, and is reported as `Ok(None)`. Only transport
/// failures surface as errors.
#[derive(Debug)]
pub struct StreetViewImagery {
    bridge: HttpBridge,
    config: GoogleMapsConfig,
    endpoint: Url,
}

impl StreetViewImagery {
    /// Create an imagery provider for the public endpoint with `api_key`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(GoogleMapsConfig::new(api_key))
    }

    /// Create an imagery provider with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: GoogleMapsConfig) -> Result<Self, ProviderBuildError> {
        let endpoint = endpoint(&config.base_url, STREETVIEW_PATH)?;
        let bridge = HttpBridge::new(&config.user_agent, config.timeout)?;
        Ok(Self {
            bridge,
            config,
            endpoint,
        })
    }

    fn build_url(&self, point: Coordinate, heading: Heading) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("size", IMAGE_SIZE)
            .append_pair("location", &point.to_string())
            .append_pair("fov", FIELD_OF_VIEW)
            .append_pair("heading", &heading.to_string())
            .append_pair("pitch", PITCH)
            .append_pair("key", &self.config.api_key);
        url
    }

    async fn fetch_async(&self, url: &Url) -> Result<Option<StreetImage>, ServiceError> {
        let response = self
            .bridge
            .client()
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.bridge.service_error(err, url))?;
        let status = response.status();
        if !status.is_success() {
            log::debug!("no imagery at {}: HTTP {status}", redact(url));
            return Ok(None);
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.bridge.service_error(err, url))?;
        let mut image = StreetImage::new(bytes.to_vec());
        image.content_type = content_type;
        Ok(Some(image))
    }
}

impl ImageryProvider for StreetViewImagery {
    fn fetch_image(
        &self,
        point: Coordinate,
        heading: Heading,
    ) -> Result<Option<StreetImage>, ImageryError> {
        let url = self.build_url(point, heading);
        Ok(self.bridge.block_on(self.fetch_async(&url))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Heading::North, "0")]
    #[case(Heading::East, "90")]
    #[case(Heading::South, "180")]
    #[case(Heading::West, "270")]
    fn build_url_sets_heading(#[case] heading: Heading, #[case] degrees: &str) {
        let config = GoogleMapsConfig::new("secret").with_base_url("http://maps.test");
        let imagery = StreetViewImagery::with_config(config).expect("imagery should build");

        let url = imagery.build_url(Coordinate::new(51.5, -0.12), heading);

        assert_eq!(
            url.as_str(),
            format!(
                "http://maps.test/maps/api/streetview?size=640x640&location=51.5%2C-0.12\
                 &fov=90&heading={degrees}&pitch=0&key=secret"
            )
        );
    }
}
