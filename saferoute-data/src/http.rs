//! Blocking bridge from the synchronous collaborator traits to `reqwest`.
//!
//! The collaborator traits in `saferoute-core` are synchronous so the engine
//! stays embeddable in synchronous contexts. Every adapter owns an
//! [`HttpBridge`] that blocks on its own Tokio runtime, or on the caller's
//! runtime when invoked from inside a multi-threaded one.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use saferoute_core::ServiceError;
use serde::de::DeserializeOwned;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

/// Error type for adapter construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
    /// The configured service URL could not be parsed.
    InvalidUrl {
        /// URL as configured.
        url: String,
        /// Parser diagnostic.
        source: url::ParseError,
    },
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
            Self::InvalidUrl { url, source } => write!(f, "invalid service URL {url}: {source}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
            Self::InvalidUrl { source, .. } => Some(source),
        }
    }
}

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "saferoute/0.1";

/// Default request timeout in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Query parameters whose values never appear in logs or errors.
const SECRET_PARAMS: [&str; 1] = ["key"];

const REDACTED: &str = "REDACTED";

/// HTTP client paired with the runtime used to drive it.
pub(crate) struct HttpBridge {
    client: Client,
    runtime: Runtime,
    timeout: Duration,
}

impl std::fmt::Debug for HttpBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBridge")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpBridge {
    /// Build a client with the given user agent and timeout, and a
    /// current-thread runtime to drive it.
    pub(crate) fn new(user_agent: &str, timeout: Duration) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            runtime,
            timeout,
        })
    }

    pub(crate) const fn client(&self) -> &Client {
        &self.client
    }

    /// Drive `future` to completion from synchronous code.
    ///
    /// Inside a multi-threaded runtime the caller's handle is used through
    /// [`tokio::task::block_in_place`]. Outside any runtime, or inside a
    /// `current_thread` runtime, the bridge's own runtime is used; in the
    /// latter case the caller's runtime is blocked for the duration.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    /// GET `url` and decode a JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ServiceError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.service_error(err, url))?
            .error_for_status()
            .map_err(|err| self.service_error(err, url))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| self.service_error(err, url))?;
        parse_json(&body)
    }

    /// Convert a `reqwest` failure into a [`ServiceError`] with the URL
    /// redacted.
    pub(crate) fn service_error(&self, error: reqwest::Error, url: &Url) -> ServiceError {
        let url = redact(url);
        if error.is_timeout() {
            return ServiceError::Timeout {
                url,
                timeout_secs: self.timeout.as_secs(),
            };
        }
        let status = error.status();
        // The client embeds the full URL, key included, in its messages.
        let message = error.without_url().to_string();
        match status {
            Some(status) => ServiceError::HttpError {
                url,
                status: status.as_u16(),
                message,
            },
            None => ServiceError::NetworkError { url, message },
        }
    }
}

/// Decode a JSON response body.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body).map_err(|err| ServiceError::ParseError {
        message: err.to_string(),
    })
}

/// Parse `base` as a service root and resolve `path` against it.
///
/// A trailing slash is assumed on `base` so that path prefixes survive.
pub(crate) fn endpoint(base: &str, path: &str) -> Result<Url, ProviderBuildError> {
    let invalid = |source| ProviderBuildError::InvalidUrl {
        url: base.to_owned(),
        source,
    };
    let root = Url::parse(&format!("{}/", base.trim_end_matches('/'))).map_err(invalid)?;
    root.join(path).map_err(invalid)
}

/// Render `url` with secret query parameters replaced.
#[must_use]
pub(crate) fn redact(url: &Url) -> String {
    let is_secret = |name: &str| SECRET_PARAMS.contains(&name);
    if !url.query_pairs().any(|(name, _)| is_secret(&name)) {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let shown = if is_secret(&name) {
                REDACTED.to_owned()
            } else {
                value.into_owned()
            };
            (name.into_owned(), shown)
        })
        .collect();
    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
