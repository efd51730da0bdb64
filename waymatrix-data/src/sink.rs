//! Output sinks writing the matrix table as CSV or JSON.

use std::io::Write;

use waymatrix_core::{MatrixSink, OutputRow, OutputSchema, SinkError};

/// Writes a header row then one CSV record per output row.
///
/// Unreachable pairs leave the duration and distance cells empty.
///
/// # Examples
/// ```
/// use waymatrix_core::{AttributeValue, FieldDescriptor, FieldType, MatrixSink, OutputRow, output_schema};
/// use waymatrix_data::CsvSink;
///
/// let id = FieldDescriptor::new("id", FieldType::String);
/// let rows = [OutputRow {
///     from_id: AttributeValue::from("A"),
///     to_id: AttributeValue::from("X"),
///     duration_hours: Some(1.5),
///     distance_km: None,
/// }];
/// let mut sink = CsvSink::new(Vec::new());
/// sink.write_rows(&output_schema(&id, &id), &rows)?;
///
/// let text = String::from_utf8(sink.into_inner())?;
/// assert_eq!(text, "FROM_ID,TO_ID,DURATION_HOURS,DISTANCE_KM\nA,X,1.5,\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct CsvSink<W> {
    writer: W,
}

impl<W: Write> CsvSink<W> {
    /// Wrap `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MatrixSink for CsvSink<W> {
    fn write_rows(&mut self, schema: &OutputSchema, rows: &[OutputRow]) -> Result<(), SinkError> {
        let mut csv = csv::Writer::from_writer(&mut self.writer);
        csv.write_record(schema.names()).map_err(SinkError::new)?;
        for row in rows {
            csv.write_record([
                row.from_id.to_string(),
                row.to_id.to_string(),
                optional_cell(row.duration_hours),
                optional_cell(row.distance_km),
            ])
            .map_err(SinkError::new)?;
        }
        csv.flush().map_err(SinkError::new)
    }
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes the rows as a pretty-printed JSON array of objects.
#[derive(Debug)]
pub struct JsonSink<W> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    /// Wrap `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MatrixSink for JsonSink<W> {
    fn write_rows(&mut self, _schema: &OutputSchema, rows: &[OutputRow]) -> Result<(), SinkError> {
        serde_json::to_writer_pretty(&mut self.writer, rows).map_err(SinkError::new)?;
        self.writer.write_all(b"\n").map_err(SinkError::new)?;
        self.writer.flush().map_err(SinkError::new)
    }
}
