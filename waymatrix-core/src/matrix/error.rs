use std::fmt;

use thiserror::Error;

use crate::client::ApiError;
use crate::crs::CrsError;
use crate::host::SinkError;
use crate::layer::GeometryKind;

/// Which input a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerRole {
    /// The start (origin) layer.
    Source,
    /// The end (destination) layer.
    Destination,
}

impl fmt::Display for LayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Destination => "destination",
        })
    }
}

/// Errors that abort a matrix invocation.
///
/// None of them is retried; the host surfaces the error as the failure
/// reason and no output rows are written.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// An input layer holds multi-point geometries.
    #[error(
        "{role} layer has {kind} geometries; multi-point layers are not accepted, \
         convert them to single points first"
    )]
    InvalidGeometryType {
        /// Offending layer.
        role: LayerRole,
        /// Declared geometry kind.
        kind: GeometryKind,
    },
    /// The combined feature count exceeds the request cap.
    #[error("the cumulative feature count {count} exceeds the limit of {limit}")]
    TooManyFeatures {
        /// Number of locations the request would carry.
        count: usize,
        /// Maximum number of locations.
        limit: usize,
    },
    /// An ID field does not exist in its layer.
    #[error("{role} layer has no field named '{field}'")]
    UnknownField {
        /// Layer that was searched.
        role: LayerRole,
        /// Requested field name.
        field: String,
    },
    /// A layer CRS cannot be reprojected to WGS84.
    #[error("cannot reproject {role} layer: {source}")]
    Crs {
        /// Layer whose CRS failed.
        role: LayerRole,
        /// Underlying CRS error.
        #[source]
        source: CrsError,
    },
    /// The routing service reported a failure.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The response matrices do not match the request.
    #[error("malformed matrix response: {reason}")]
    MalformedResponse {
        /// Description of the mismatch.
        reason: String,
    },
    /// The host asked the invocation to stop.
    #[error("matrix invocation was canceled")]
    Canceled,
    /// The output sink failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
}
