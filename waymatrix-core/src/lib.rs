//! Core domain types for the waymatrix engine.
//!
//! A matrix invocation takes two point layers supplied by a host, reprojects
//! their geometries to WGS84, asks a routing service for the travel-time and
//! travel-distance matrix between them and hands one row per
//! origin/destination pair back to the host.
//!
//! The crate is transport-agnostic: the routing service, the coordinate
//! transformer, the layers and the output sink are traits implemented by
//! adapters such as `waymatrix-data`.

pub mod algorithm;
pub mod client;
pub mod crs;
pub mod host;
pub mod layer;
pub mod matrix;
pub mod profile;

#[doc(hidden)]
pub mod test_support;

pub use algorithm::{MatrixAlgorithm, MatrixParameters, MatrixSummary};
pub use client::{ApiError, MatrixClient};
pub use crs::{BuiltinTransformer, Crs, CrsError, CrsTransformer, Reproject};
pub use host::{Feedback, LogFeedback, MatrixSink, SinkError};
pub use layer::{
    AttributeValue, FieldDescriptor, FieldType, GeometryKind, LayerId, PointFeature, PointLayer,
};
pub use matrix::{
    IndexAssignment, LayerRole, MAX_FEATURES, MatrixError, MatrixRequest, MatrixResponse, Metric,
    OutputField, OutputRow, OutputSchema, assign_indices, build_output_rows, build_request,
    output_schema, validate_layers,
};
pub use profile::{Profile, UnknownProfile};
