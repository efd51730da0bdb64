//! The matrix invocation: validate, reproject, request, write.
//!
//! [`MatrixAlgorithm`] ties the host traits to the pure functions in
//! [`crate::matrix`]. One call to [`MatrixAlgorithm::run`] makes at most one
//! routing request and hands the sink either every row or none.
//!
//! # Example
//!
//! ```
//! use geo::Point;
//! use waymatrix_core::test_support::{MemoryLayer, MemorySink, RecordingFeedback, StubMatrixClient};
//! use waymatrix_core::{MatrixAlgorithm, MatrixParameters, MatrixResponse, Profile};
//!
//! let stops = MemoryLayer::points("stops", "id", [("A", Point::new(0.0, 0.0))]);
//! let shops = MemoryLayer::points("shops", "id", [("X", Point::new(1.0, 1.0))]);
//! let client = StubMatrixClient::with_response(MatrixResponse::from_values(
//!     vec![vec![1800.0]],
//!     vec![vec![2500.0]],
//! ));
//!
//! let params = MatrixParameters::new(&stops, "id", &shops, "id", Profile::FootWalking);
//! let mut sink = MemorySink::default();
//! let summary = MatrixAlgorithm::new(client).run(&params, &mut sink, &RecordingFeedback::default())?;
//!
//! assert_eq!(summary.rows, 1);
//! assert_eq!(sink.rows()[0].duration_hours, Some(0.5));
//! # Ok::<(), waymatrix_core::MatrixError>(())
//! ```

use geo::Coord;
use log::debug;

use crate::client::MatrixClient;
use crate::crs::{BuiltinTransformer, CrsTransformer, Reproject};
use crate::host::{Feedback, MatrixSink};
use crate::layer::{AttributeValue, FieldDescriptor, PointFeature, PointLayer};
use crate::matrix::{
    LayerRole, LayerSummary, MatrixError, assign_indices, build_output_rows, build_request,
    matrix_endpoint, output_schema, validate_layers,
};
use crate::profile::Profile;

/// Inputs of one matrix invocation.
#[derive(Clone, Copy)]
pub struct MatrixParameters<'a> {
    /// Origin layer.
    pub source: &'a dyn PointLayer,
    /// ID field read from the origin layer.
    pub source_field: &'a str,
    /// Destination layer.
    pub destination: &'a dyn PointLayer,
    /// ID field read from the destination layer.
    pub destination_field: &'a str,
    /// Travel mode.
    pub profile: Profile,
}

impl<'a> MatrixParameters<'a> {
    /// Bundle the invocation inputs.
    pub fn new(
        source: &'a dyn PointLayer,
        source_field: &'a str,
        destination: &'a dyn PointLayer,
        destination_field: &'a str,
        profile: Profile,
    ) -> Self {
        Self {
            source,
            source_field,
            destination,
            destination_field,
            profile,
        }
    }

    /// Return `true` when both parameters name the same layer handle.
    pub fn source_equals_destination(&self) -> bool {
        self.source.id() == self.destination.id()
    }
}

/// Counts reported after a successful invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixSummary {
    /// Locations sent to the routing service.
    pub locations: usize,
    /// Rows handed to the sink.
    pub rows: usize,
}

/// Runs matrix invocations against a routing client.
#[derive(Debug, Clone)]
pub struct MatrixAlgorithm<C, T = BuiltinTransformer> {
    client: C,
    transformer: T,
}

impl<C: MatrixClient> MatrixAlgorithm<C> {
    /// Use `client` with the built-in WGS84/Web Mercator transformer.
    pub fn new(client: C) -> Self {
        Self {
            client,
            transformer: BuiltinTransformer,
        }
    }
}

impl<C: MatrixClient, T: CrsTransformer> MatrixAlgorithm<C, T> {
    /// Use `client` with a host-supplied CRS transformer.
    pub fn with_transformer(client: C, transformer: T) -> Self {
        Self {
            client,
            transformer,
        }
    }

    /// Borrow the routing client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Execute one invocation.
    ///
    /// # Errors
    /// Fails without contacting the service on unknown ID fields, multi-point
    /// layers, too many features or an unsupported CRS. Routing failures are
    /// reported to `feedback` before being returned. Nothing reaches `sink`
    /// unless every row was built and the host did not cancel.
    pub fn run(
        &self,
        params: &MatrixParameters<'_>,
        sink: &mut dyn MatrixSink,
        feedback: &dyn Feedback,
    ) -> Result<MatrixSummary, MatrixError> {
        let source_field = resolve_field(params.source, params.source_field, LayerRole::Source)?;
        let destination_field = resolve_field(
            params.destination,
            params.destination_field,
            LayerRole::Destination,
        )?;

        let same_layer = params.source_equals_destination();
        let source_features = params.source.features();
        let destination_features = if same_layer {
            source_features.clone()
        } else {
            params.destination.features()
        };
        // The cap applies to what is sent, not to what the layer reports.
        validate_layers(
            summarize(params.source, &source_features),
            summarize(params.destination, &destination_features),
            same_layer,
        )?;

        let locations = self.locations(params, &source_features, &destination_features, same_layer)?;
        let indices = assign_indices(
            source_features.len(),
            destination_features.len(),
            same_layer,
        );
        feedback.push_info(&format!("Amount of features: {}", locations.len()));

        let request = build_request(params.profile, locations, indices);
        let endpoint = matrix_endpoint(params.profile);
        debug!(
            "requesting {} with {} locations ({} sources, {} destinations)",
            endpoint,
            request.locations.len(),
            request.sources.len(),
            request.destinations.len()
        );
        let query = [("profile", params.profile.as_str())];
        let response = self
            .client
            .request(&endpoint, &query, &request)
            .inspect_err(|err| {
                feedback.report_error(&format!("{}:\n{err}", err.category()));
            })?;

        if feedback.is_canceled() {
            return Err(MatrixError::Canceled);
        }
        let source_attributes = attributes(&source_features, &source_field);
        let destination_attributes = attributes(&destination_features, &destination_field);
        let rows = build_output_rows(&response, &source_attributes, &destination_attributes)?;
        if feedback.is_canceled() {
            return Err(MatrixError::Canceled);
        }

        let schema = output_schema(&source_field, &destination_field);
        sink.write_rows(&schema, &rows)?;
        debug!("wrote {} matrix rows", rows.len());

        Ok(MatrixSummary {
            locations: request.locations.len(),
            rows: rows.len(),
        })
    }

    fn locations(
        &self,
        params: &MatrixParameters<'_>,
        source_features: &[PointFeature],
        destination_features: &[PointFeature],
        same_layer: bool,
    ) -> Result<Vec<Coord<f64>>, MatrixError> {
        let source_crs = params.source.crs();
        let source_xform = self
            .transformer
            .to_wgs84(source_crs)
            .map_err(|source| MatrixError::Crs {
                role: LayerRole::Source,
                source,
            })?;
        let mut locations = reproject_all(source_xform.as_ref(), source_features);
        if same_layer {
            return Ok(locations);
        }

        let destination_crs = params.destination.crs();
        if destination_crs == source_crs {
            locations.extend(reproject_all(source_xform.as_ref(), destination_features));
        } else {
            let destination_xform = self
                .transformer
                .to_wgs84(destination_crs)
                .map_err(|source| MatrixError::Crs {
                    role: LayerRole::Destination,
                    source,
                })?;
            locations.extend(reproject_all(destination_xform.as_ref(), destination_features));
        }
        Ok(locations)
    }
}

fn resolve_field(
    layer: &dyn PointLayer,
    name: &str,
    role: LayerRole,
) -> Result<FieldDescriptor, MatrixError> {
    layer.field(name).ok_or_else(|| MatrixError::UnknownField {
        role,
        field: name.to_owned(),
    })
}

fn summarize(layer: &dyn PointLayer, features: &[PointFeature]) -> LayerSummary {
    if layer.feature_count() != features.len() {
        debug!(
            "layer {} reports {} features but yielded {}",
            layer.id(),
            layer.feature_count(),
            features.len()
        );
    }
    LayerSummary::new(layer.geometry_kind(), features.len())
}

fn reproject_all(xform: &dyn Reproject, features: &[PointFeature]) -> Vec<Coord<f64>> {
    features
        .iter()
        .map(|feature| xform.reproject(feature.geometry))
        .collect()
}

fn attributes(features: &[PointFeature], field: &FieldDescriptor) -> Vec<AttributeValue> {
    features
        .iter()
        .map(|feature| feature.attribute(&field.name))
        .collect()
}
