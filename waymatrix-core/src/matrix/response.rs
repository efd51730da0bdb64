//! Matrices decoded from the routing service.

use serde::{Deserialize, Serialize};

/// Matrices returned by the routing service.
///
/// Rows follow the request's `sources` and columns its `destinations`.
/// Unreachable pairs are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixResponse {
    /// Travel durations in seconds.
    pub durations: Vec<Vec<Option<f64>>>,
    /// Travel distances in metres.
    pub distances: Vec<Vec<Option<f64>>>,
}

impl MatrixResponse {
    /// Build a response from fully populated matrices.
    ///
    /// # Examples
    /// ```
    /// use waymatrix_core::MatrixResponse;
    ///
    /// let response = MatrixResponse::from_values(vec![vec![60.0]], vec![vec![900.0]]);
    /// assert_eq!(response.durations, vec![vec![Some(60.0)]]);
    /// ```
    pub fn from_values(durations: Vec<Vec<f64>>, distances: Vec<Vec<f64>>) -> Self {
        fn wrap(matrix: Vec<Vec<f64>>) -> Vec<Vec<Option<f64>>> {
            matrix
                .into_iter()
                .map(|row| row.into_iter().map(Some).collect())
                .collect()
        }
        Self {
            durations: wrap(durations),
            distances: wrap(distances),
        }
    }
}
