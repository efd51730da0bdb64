//! Input checks performed before any network call.

use crate::layer::GeometryKind;

use super::error::{LayerRole, MatrixError};

/// Maximum number of locations in one matrix request.
pub const MAX_FEATURES: usize = 100;

/// Geometry kind and feature count of one input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSummary {
    /// Declared geometry kind.
    pub kind: GeometryKind,
    /// Number of features.
    pub count: usize,
}

impl LayerSummary {
    /// Construct a summary.
    pub const fn new(kind: GeometryKind, count: usize) -> Self {
        Self { kind, count }
    }
}

/// Reject layers the routing service cannot be asked about.
///
/// Geometry kinds are checked first and independently for both layers, so a
/// multi-point layer fails regardless of feature counts. When
/// `source_equals_destination` is set the destination features are not
/// duplicated in the request and only the source count is capped.
///
/// # Examples
/// ```
/// use waymatrix_core::GeometryKind;
/// use waymatrix_core::matrix::{LayerSummary, validate_layers};
///
/// let fifty = LayerSummary::new(GeometryKind::Point, 50);
/// assert!(validate_layers(fifty, fifty, false).is_ok());
///
/// let fifty_one = LayerSummary::new(GeometryKind::Point, 51);
/// assert!(validate_layers(fifty_one, fifty, false).is_err());
/// ```
pub fn validate_layers(
    source: LayerSummary,
    destination: LayerSummary,
    source_equals_destination: bool,
) -> Result<(), MatrixError> {
    for (role, summary) in [
        (LayerRole::Source, source),
        (LayerRole::Destination, destination),
    ] {
        if summary.kind.is_multi() {
            return Err(MatrixError::InvalidGeometryType {
                role,
                kind: summary.kind,
            });
        }
    }

    let count = if source_equals_destination {
        source.count
    } else {
        source.count.saturating_add(destination.count)
    };
    if count > MAX_FEATURES {
        return Err(MatrixError::TooManyFeatures {
            count,
            limit: MAX_FEATURES,
        });
    }
    Ok(())
}
