//! Adapters connecting the waymatrix core to files and routing services.
//!
//! Responsibilities:
//! - Talk to openrouteservice-compatible matrix endpoints over HTTP.
//! - Load point layers from GeoJSON.
//! - Write output tables as CSV or JSON.
//!
//! Boundaries:
//! - Do not encode matrix rules (they live in `waymatrix-core`).
//! - Keep blocking I/O off async executors.

pub mod layer;
pub mod routing;
pub mod sink;

pub use layer::{GeoJsonLayer, LayerLoadError};
pub use routing::{ClientBuildError, OrsClientConfig, OrsMatrixClient};
pub use sink::{CsvSink, JsonSink};
