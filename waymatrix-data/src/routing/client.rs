//! Blocking matrix client over `reqwest`.

use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;
use waymatrix_core::{ApiError, MatrixClient, MatrixRequest, MatrixResponse};

use super::ors::{MatrixBody, parse_error_body};

/// Public openrouteservice API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

/// Default user agent for matrix requests.
pub const DEFAULT_USER_AGENT: &str = "waymatrix/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error type for [`OrsMatrixClient`] construction failures.
#[derive(Debug)]
pub enum ClientBuildError {
    /// The base URL is not an absolute HTTP(S) URL.
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for ClientBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl { url, reason } => {
                write!(f, "invalid routing service URL '{url}': {reason}")
            }
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for ClientBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBaseUrl { .. } => None,
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Configuration for [`OrsMatrixClient`].
#[derive(Debug, Clone)]
pub struct OrsClientConfig {
    /// Service root, e.g. `"https://api.openrouteservice.org"`.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OrsClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OrsClientConfig {
    /// Create a configuration for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
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

/// Matrix client for openrouteservice-compatible servers.
///
/// The client owns a current-thread Tokio runtime reused across calls. When
/// called from inside a multi-thread runtime it blocks that runtime's worker
/// with [`tokio::task::block_in_place`] instead. Requests are never retried.
/// The owned runtime is shut down in the background on drop, so the client
/// may be dropped from async code.
pub struct OrsMatrixClient {
    client: Client,
    config: OrsClientConfig,
    base_url: Url,
    // Only `None` while dropping.
    runtime: Option<Runtime>,
}

impl Drop for OrsMatrixClient {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for OrsMatrixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrsMatrixClient")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl OrsMatrixClient {
    /// Create a client for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(OrsClientConfig::new(base_url))
    }

    /// Create a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: OrsClientConfig) -> Result<Self, ClientBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            base_url,
            runtime: Some(runtime),
        })
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &OrsClientConfig {
        &self.config
    }

    /// Build the request URL for `endpoint` with `query` appended.
    ///
    /// The endpoint is appended to the base path rather than replacing it, so
    /// self-hosted services mounted below a prefix keep that prefix.
    fn build_url(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Url::parse_with_params(&joined, query).map_err(|err| ApiError::Network {
            url: joined.clone(),
            message: err.to_string(),
        })
    }

    async fn fetch(&self, url: Url, body: &MatrixRequest) -> Result<MatrixResponse, ApiError> {
        let url_text = url.to_string();
        debug!(
            "POST {url_text} with {} locations",
            body.locations.len()
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url_text))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url_text))?;

        if !status.is_success() {
            return Err(status_error(&url_text, status, &text));
        }

        let decoded: MatrixBody = serde_json::from_str(&text).map_err(|err| ApiError::Decode {
            message: err.to_string(),
        })?;
        decoded.into_response()
    }

    /// Convert a reqwest error to an [`ApiError`].
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> ApiError {
        if error.is_timeout() {
            return ApiError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if error.is_decode() {
            return ApiError::Decode {
                message: error.to_string(),
            };
        }
        ApiError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    let invalid = |reason: String| ClientBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query strings and fragments are not allowed".to_owned()));
    }
    Ok(url)
}

fn status_error(url: &str, status: StatusCode, body: &str) -> ApiError {
    let (code, message) = parse_error_body(body);
    let message = message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
    });
    ApiError::Status {
        url: url.to_owned(),
        status: status.as_u16(),
        code,
        message,
    }
}

impl MatrixClient for OrsMatrixClient {
    /// Post `body` to `endpoint` and decode the matrices.
    ///
    /// # Runtime requirements
    ///
    /// Outside Tokio the client's own runtime drives the request. Inside a
    /// multi-thread runtime the worker is handed over with
    /// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime the
    /// request runs on the client's runtime from a scoped helper thread, and
    /// the caller's runtime is blocked until it completes.
    fn request(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &MatrixRequest,
    ) -> Result<MatrixResponse, ApiError> {
        let url = self.build_url(endpoint, query)?;
        let runtime = self.runtime.as_ref().ok_or_else(|| ApiError::Network {
            url: url.to_string(),
            message: "client runtime has shut down".to_owned(),
        })?;
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.fetch(url, body)))
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| runtime.block_on(self.fetch(url, body)))
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            }),
            Err(_) => runtime.block_on(self.fetch(url, body)),
        }
    }
}
