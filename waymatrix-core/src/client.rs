//! Routing-service client seam.
//!
//! The [`MatrixClient`] trait is synchronous to keep the core embeddable in
//! synchronous hosts. Adapters that talk HTTP block internally.

use thiserror::Error;

use crate::matrix::{MatrixRequest, MatrixResponse};

/// Errors reported by a [`MatrixClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request could not reach the service.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The service did not answer in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}: {message}")]
    Status {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Service-specific error code, when the body carried one.
        code: Option<i64>,
        /// Error message from the body, or the status reason.
        message: String,
    },
    /// The response body was not a usable matrix response.
    #[error("failed to decode matrix response: {message}")]
    Decode {
        /// Decoder error description.
        message: String,
    },
}

impl ApiError {
    /// Short class name written to the host's diagnostic channel.
    ///
    /// # Examples
    /// ```
    /// use waymatrix_core::ApiError;
    ///
    /// let err = ApiError::Decode { message: "eof".into() };
    /// assert_eq!(err.category(), "DecodeError");
    /// ```
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Network { .. } => "NetworkError",
            Self::Timeout { .. } => "Timeout",
            Self::Status { .. } => "ApiError",
            Self::Decode { .. } => "DecodeError",
        }
    }
}

/// Send one matrix request to a routing service.
///
/// `endpoint` is the path below the service's base URL and `query` the extra
/// query parameters. Implementations must not retry.
pub trait MatrixClient {
    /// Send `body` and return the decoded matrices.
    fn request(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &MatrixRequest,
    ) -> Result<MatrixResponse, ApiError>;
}

impl<C: MatrixClient + ?Sized> MatrixClient for Box<C> {
    fn request(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &MatrixRequest,
    ) -> Result<MatrixResponse, ApiError> {
        (**self).request(endpoint, query, body)
    }
}

impl<C: MatrixClient + ?Sized> MatrixClient for &C {
    fn request(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &MatrixRequest,
    ) -> Result<MatrixResponse, ApiError> {
        (**self).request(endpoint, query, body)
    }
}
