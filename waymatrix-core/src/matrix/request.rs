//! Matrix request payload.

use geo::Coord;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::profile::Profile;

use super::indices::IndexAssignment;

/// Label echoed back by the routing service for diagnostics.
pub const MATRIX_REQUEST_ID: &str = "Matrix";

/// Quantity the routing service is asked to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Travel distance in metres.
    Distance,
    /// Travel duration in seconds.
    Duration,
}

/// Payload sent to the routing service.
///
/// The profile selects the endpoint and is not part of the JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRequest {
    /// Travel mode.
    #[serde(skip)]
    pub profile: Profile,
    /// WGS84 coordinates, serialised as `[longitude, latitude]` pairs.
    #[serde(serialize_with = "serialize_locations")]
    pub locations: Vec<Coord<f64>>,
    /// Indices of the origins in `locations`.
    pub sources: Vec<usize>,
    /// Indices of the destinations in `locations`.
    pub destinations: Vec<usize>,
    /// Requested metrics; always distance and duration.
    pub metrics: Vec<Metric>,
    /// Diagnostic label.
    pub id: String,
}

fn serialize_locations<S>(locations: &[Coord<f64>], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(locations.len()))?;
    for coord in locations {
        seq.serialize_element(&[coord.x, coord.y])?;
    }
    seq.end()
}

/// Assemble the request for `profile` from ordered locations and indices.
///
/// # Examples
/// ```
/// use geo::coord;
/// use waymatrix_core::{Profile, assign_indices, build_request};
///
/// let locations = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }];
/// let request = build_request(Profile::DrivingCar, locations, assign_indices(1, 1, false));
/// assert_eq!(request.sources, vec![0]);
/// assert_eq!(request.destinations, vec![1]);
/// ```
pub fn build_request(
    profile: Profile,
    locations: Vec<Coord<f64>>,
    indices: IndexAssignment,
) -> MatrixRequest {
    MatrixRequest {
        profile,
        locations,
        sources: indices.sources,
        destinations: indices.destinations,
        metrics: vec![Metric::Distance, Metric::Duration],
        id: MATRIX_REQUEST_ID.to_owned(),
    }
}

/// Path of the matrix endpoint for `profile`, relative to the service root.
pub fn matrix_endpoint(profile: Profile) -> String {
    format!("/v2/matrix/{}", profile.as_str())
}
