//! Facade crate for waymatrix, a travel time and distance matrix builder.
//!
//! This crate re-exports the core domain types and, behind the `http`
//! feature, the openrouteservice client, GeoJSON loader and output sinks.

#![forbid(unsafe_code)]

pub use waymatrix_core::{
    ApiError, AttributeValue, BuiltinTransformer, Crs, CrsError, CrsTransformer, Feedback,
    FieldDescriptor, FieldType, GeometryKind, IndexAssignment, LayerId, LayerRole, LogFeedback,
    MAX_FEATURES, MatrixAlgorithm, MatrixClient, MatrixError, MatrixParameters, MatrixRequest,
    MatrixResponse, MatrixSink, MatrixSummary, Metric, OutputField, OutputRow, OutputSchema,
    PointFeature, PointLayer, Profile, Reproject, SinkError, UnknownProfile, assign_indices,
    build_output_rows, build_request, output_schema, validate_layers,
};

#[cfg(feature = "http")]
pub use waymatrix_data::{
    ClientBuildError, CsvSink, GeoJsonLayer, JsonSink, LayerLoadError, OrsClientConfig,
    OrsMatrixClient,
};
