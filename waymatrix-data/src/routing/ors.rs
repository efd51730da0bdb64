//! openrouteservice Matrix API wire types.
//!
//! See: <https://openrouteservice.org/dev/#/api-docs/v2/matrix>

use serde::Deserialize;
use waymatrix_core::{ApiError, MatrixResponse};

type Matrix = Vec<Vec<Option<f64>>>;

/// Successful Matrix API reply.
///
/// Only the metrics requested are present; the service also echoes
/// `metadata`, `sources` and `destinations`, which are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct MatrixBody {
    pub durations: Option<Matrix>,
    pub distances: Option<Matrix>,
}

impl MatrixBody {
    /// Require both metric matrices.
    pub(crate) fn into_response(self) -> Result<MatrixResponse, ApiError> {
        let durations = self.durations.ok_or_else(|| missing("durations"))?;
        let distances = self.distances.ok_or_else(|| missing("distances"))?;
        Ok(MatrixResponse {
            durations,
            distances,
        })
    }
}

fn missing(metric: &str) -> ApiError {
    ApiError::Decode {
        message: format!("matrix response is missing the {metric} array"),
    }
}

/// Error reply, either `{"error": {"code", "message"}}` or `{"error": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed { error: ErrorDetail },
    Plain { error: String },
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<i64>,
    message: Option<String>,
}

/// Extract the service error code and message from a non-success body.
pub(crate) fn parse_error_body(body: &str) -> (Option<i64>, Option<String>) {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Detailed { error }) => (error.code, error.message),
        Ok(ErrorBody::Plain { error }) => (None, Some(error)),
        Err(_) => (None, None),
    }
}
