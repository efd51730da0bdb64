//! In-memory layers, sinks, feedback and routing clients used by unit and
//! behaviour tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use geo::Point;

use crate::{
    ApiError, AttributeValue, Crs, Feedback, FieldDescriptor, FieldType, GeometryKind, LayerId,
    MatrixClient, MatrixRequest, MatrixResponse, MatrixSink, OutputRow, OutputSchema,
    PointFeature, PointLayer, SinkError,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `PointLayer` backed by a vector of features.
#[derive(Debug, Clone)]
pub struct MemoryLayer {
    id: LayerId,
    features: Vec<PointFeature>,
    fields: Vec<FieldDescriptor>,
    kind: GeometryKind,
    crs: Crs,
    reported_count: Option<usize>,
}

impl MemoryLayer {
    /// Create an empty WGS84 point layer with one field.
    pub fn new(id: impl Into<String>, field: FieldDescriptor) -> Self {
        Self {
            id: LayerId::new(id),
            features: Vec::new(),
            fields: vec![field],
            kind: GeometryKind::Point,
            crs: Crs::wgs84(),
            reported_count: None,
        }
    }

    /// Create a layer whose string field `field` holds each point's label.
    pub fn points<'a, I>(id: impl Into<String>, field: &str, points: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Point<f64>)>,
    {
        points.into_iter().fold(
            Self::new(id, FieldDescriptor::new(field, FieldType::String)),
            |layer, (label, point)| {
                layer.with_feature(PointFeature::new(point).with_attribute(field, label))
            },
        )
    }

    /// Create a layer of `count` unlabelled points along the equator.
    pub fn with_count(id: impl Into<String>, field: &str, count: usize) -> Self {
        (0..count).fold(
            Self::new(id, FieldDescriptor::new(field, FieldType::Integer)),
            |layer, index| {
                let value = i64::try_from(index).unwrap_or(i64::MAX);
                layer.with_feature(
                    PointFeature::new(Point::new(index as f64 * 0.001, 0.0))
                        .with_attribute(field, value),
                )
            },
        )
    }

    /// Append a feature.
    #[must_use]
    pub fn with_feature(mut self, feature: PointFeature) -> Self {
        self.features.push(feature);
        self
    }

    /// Add another field descriptor.
    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Replace the layer handle.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = LayerId::new(id);
        self
    }

    /// Override the declared geometry kind.
    #[must_use]
    pub fn with_geometry_kind(mut self, kind: GeometryKind) -> Self {
        self.kind = kind;
        self
    }

    /// Override the layer CRS.
    #[must_use]
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    /// Report `count` from `feature_count` regardless of the stored features.
    #[must_use]
    pub fn with_reported_count(mut self, count: usize) -> Self {
        self.reported_count = Some(count);
        self
    }
}

impl PointLayer for MemoryLayer {
    fn id(&self) -> &LayerId {
        &self.id
    }

    fn features(&self) -> Vec<PointFeature> {
        self.features.clone()
    }

    fn feature_count(&self) -> usize {
        self.reported_count.unwrap_or(self.features.len())
    }

    fn geometry_kind(&self) -> GeometryKind {
        self.kind
    }

    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn field(&self, name: &str) -> Option<FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name).cloned()
    }
}

/// `MatrixSink` keeping the written schema and rows.
#[derive(Debug, Default)]
pub struct MemorySink {
    schema: Option<OutputSchema>,
    rows: Vec<OutputRow>,
    writes: usize,
}

impl MemorySink {
    /// Rows received so far.
    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    /// Schema of the last write.
    pub fn schema(&self) -> Option<&OutputSchema> {
        self.schema.as_ref()
    }

    /// Number of `write_rows` calls.
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// Return `true` when nothing was written.
    pub fn is_empty(&self) -> bool {
        self.writes == 0 && self.rows.is_empty()
    }
}

impl MatrixSink for MemorySink {
    fn write_rows(&mut self, schema: &OutputSchema, rows: &[OutputRow]) -> Result<(), SinkError> {
        self.schema = Some(schema.clone());
        self.rows.extend_from_slice(rows);
        self.writes += 1;
        Ok(())
    }
}

/// `MatrixSink` that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSink;

impl MatrixSink for FailingSink {
    fn write_rows(&mut self, _schema: &OutputSchema, _rows: &[OutputRow]) -> Result<(), SinkError> {
        Err(SinkError::new(std::io::Error::other("sink unavailable")))
    }
}

/// `Feedback` recording every message.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    canceled: AtomicBool,
}

impl RecordingFeedback {
    /// Informational messages in arrival order.
    pub fn infos(&self) -> Vec<String> {
        lock(&self.infos).clone()
    }

    /// Error messages in arrival order.
    pub fn errors(&self) -> Vec<String> {
        lock(&self.errors).clone()
    }

    /// Ask the running invocation to stop.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}

impl Feedback for RecordingFeedback {
    fn push_info(&self, message: &str) {
        lock(&self.infos).push(message.to_owned());
    }

    fn report_error(&self, message: &str) {
        lock(&self.errors).push(message.to_owned());
    }

    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// A request seen by [`StubMatrixClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Endpoint path.
    pub endpoint: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Request payload.
    pub body: MatrixRequest,
}

/// `MatrixClient` returning a canned result and recording requests.
#[derive(Debug)]
pub struct StubMatrixClient {
    result: Result<MatrixResponse, ApiError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubMatrixClient {
    /// Answer every request with `response`.
    pub fn with_response(response: MatrixResponse) -> Self {
        Self {
            result: Ok(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request with `error`.
    pub fn with_error(error: ApiError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }
}

impl MatrixClient for StubMatrixClient {
    fn request(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &MatrixRequest,
    ) -> Result<MatrixResponse, ApiError> {
        lock(&self.calls).push(RecordedCall {
            endpoint: endpoint.to_owned(),
            query: query
                .iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect(),
            body: body.clone(),
        });
        self.result.clone()
    }
}

/// Matrix of `rows` x `cols` cells all set to `seconds` and `metres`.
pub fn uniform_response(rows: usize, cols: usize, seconds: f64, metres: f64) -> MatrixResponse {
    MatrixResponse::from_values(vec![vec![seconds; cols]; rows], vec![vec![metres; cols]; rows])
}

/// Attribute helper for string IDs.
pub fn ids<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<AttributeValue> {
    labels.into_iter().map(AttributeValue::from).collect()
}
