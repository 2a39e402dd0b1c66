//! `LampDetector` backed by an HTTP object-detection service.
//!
//! The detector model runs out of process. Images are POSTed as the raw
//! request body with their MIME type, and the service answers with
//! `{"detections": <count>}`. Statuses `415` and `422` mean the image could
//! not be processed; other failures are transport errors.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use saferoute_core::{DetectionError, LampDetector, StreetImage};
use serde::Deserialize;
use url::Url;

use crate::http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpBridge, ProviderBuildError, parse_json};

/// Default detection endpoint of a locally running detector.
pub const DEFAULT_DETECTOR_URL: &str = "http://localhost:8000/detect";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Configuration for [`HttpLampDetector`].
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Full URL of the detection endpoint.
    pub endpoint: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_DETECTOR_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl DetectorConfig {
    /// Create a configuration for the detector at `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
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
}

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    detections: u32,
}

/// Lamp detector calling a remote detection service.
#[derive(Debug)]
pub struct HttpLampDetector {
    bridge: HttpBridge,
    endpoint: Url,
}

impl HttpLampDetector {
    /// Create a detector for the service at `endpoint`.
    ///
    /// # Errors
    /// Returns an error if the endpoint is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(DetectorConfig::new(endpoint))
    }

    /// Create a detector with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the endpoint is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: DetectorConfig) -> Result<Self, ProviderBuildError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|source| ProviderBuildError::InvalidUrl {
                url: config.endpoint.clone(),
                source,
            })?;
        let bridge = HttpBridge::new(&config.user_agent, config.timeout)?;
        Ok(Self { bridge, endpoint })
    }

    async fn detect_async(&self, image: &StreetImage) -> Result<u32, DetectionError> {
        let content_type = image
            .content_type
            .as_deref()
            .unwrap_or(FALLBACK_CONTENT_TYPE);
        let response = self
            .bridge
            .client()
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, content_type)
            .body(image.bytes.clone())
            .send()
            .await
            .map_err(|err| self.bridge.service_error(err, &self.endpoint))?;
        let status = response.status();
        if is_unsupported_image(status) {
            let message = response.text().await.unwrap_or_default();
            return Err(DetectionError::UnsupportedImage {
                message: unsupported_message(status, &message),
            });
        }
        let body = response
            .error_for_status()
            .map_err(|err| self.bridge.service_error(err, &self.endpoint))?
            .bytes()
            .await
            .map_err(|err| self.bridge.service_error(err, &self.endpoint))?;
        let DetectionResponse { detections } = parse_json(&body)?;
        Ok(detections)
    }
}

impl LampDetector for HttpLampDetector {
    fn count_lamps(&self, image: &StreetImage) -> Result<u32, DetectionError> {
        self.bridge.block_on(self.detect_async(image))
    }
}

fn is_unsupported_image(status: StatusCode) -> bool {
    status == StatusCode::UNSUPPORTED_MEDIA_TYPE || status == StatusCode::UNPROCESSABLE_ENTITY
}

fn unsupported_message(status: StatusCode, body: &str) -> String {
    let detail = body.trim();
    if detail.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {detail}")
    }
}
