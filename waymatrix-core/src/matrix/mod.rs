//! Build matrix requests and turn matrix responses into output rows.
//!
//! The pieces compose in a fixed order: [`validate_layers`] rejects inputs
//! before any network call, [`assign_indices`] lays out the combined
//! locations array, [`build_request`] produces the payload and
//! [`build_output_rows`] zips the response with the ID attributes.

mod error;
mod indices;
mod output;
mod request;
mod response;
mod validate;

pub use error::{LayerRole, MatrixError};
pub use indices::{IndexAssignment, assign_indices};
pub use output::{
    DISTANCE_KM, DURATION_HOURS, FROM_ID, OutputField, OutputRow, OutputSchema, TO_ID,
    build_output_rows, output_schema,
};
pub use request::{MATRIX_REQUEST_ID, MatrixRequest, Metric, build_request, matrix_endpoint};
pub use response::MatrixResponse;
pub use validate::{LayerSummary, MAX_FEATURES, validate_layers};
