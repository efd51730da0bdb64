//! Output table schema and rows.

use serde::Serialize;

use crate::layer::{AttributeValue, FieldDescriptor, FieldType};

use super::error::MatrixError;
use super::response::MatrixResponse;

/// Column holding the source ID.
pub const FROM_ID: &str = "FROM_ID";
/// Column holding the destination ID.
pub const TO_ID: &str = "TO_ID";
/// Column holding the travel duration in hours.
pub const DURATION_HOURS: &str = "DURATION_HOURS";
/// Column holding the travel distance in kilometres.
pub const DISTANCE_KM: &str = "DISTANCE_KM";

const SECONDS_PER_HOUR: f64 = 3600.0;
const METRES_PER_KILOMETRE: f64 = 1000.0;

/// One column of the output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputField {
    /// Column name.
    pub name: &'static str,
    /// Column type.
    pub field_type: FieldType,
}

/// Ordered columns of the output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSchema {
    /// Columns in output order.
    pub fields: Vec<OutputField>,
}

impl OutputSchema {
    /// Column names in output order.
    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }
}

/// Schema for the given ID fields.
///
/// The ID columns take the type of the field they are read from; the metric
/// columns are always doubles.
///
/// # Examples
/// ```
/// use waymatrix_core::{FieldDescriptor, FieldType, output_schema};
///
/// let schema = output_schema(
///     &FieldDescriptor::new("stop_id", FieldType::Integer),
///     &FieldDescriptor::new("name", FieldType::String),
/// );
/// assert_eq!(
///     schema.names(),
///     ["FROM_ID", "TO_ID", "DURATION_HOURS", "DISTANCE_KM"]
/// );
/// assert_eq!(schema.fields[0].field_type, FieldType::Integer);
/// ```
pub fn output_schema(
    source_field: &FieldDescriptor,
    destination_field: &FieldDescriptor,
) -> OutputSchema {
    OutputSchema {
        fields: vec![
            OutputField {
                name: FROM_ID,
                field_type: source_field.field_type,
            },
            OutputField {
                name: TO_ID,
                field_type: destination_field.field_type,
            },
            OutputField {
                name: DURATION_HOURS,
                field_type: FieldType::Double,
            },
            OutputField {
                name: DISTANCE_KM,
                field_type: FieldType::Double,
            },
        ],
    }
}

/// One origin/destination pair of the output table.
///
/// Durations and distances are `None` when the service could not route the
/// pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    /// Source ID attribute.
    #[serde(rename = "FROM_ID")]
    pub from_id: AttributeValue,
    /// Destination ID attribute.
    #[serde(rename = "TO_ID")]
    pub to_id: AttributeValue,
    /// Travel duration in hours.
    #[serde(rename = "DURATION_HOURS")]
    pub duration_hours: Option<f64>,
    /// Travel distance in kilometres.
    #[serde(rename = "DISTANCE_KM")]
    pub distance_km: Option<f64>,
}

/// Zip the response matrices with the ID attributes, row-major.
///
/// Every source attribute is paired with every destination attribute, with
/// all destinations of the first source first. The attribute slices are in
/// original feature order, independent of how locations were deduplicated.
///
/// # Errors
/// Returns [`MatrixError::MalformedResponse`] when either matrix does not have
/// `source_attributes.len()` rows of `destination_attributes.len()` cells.
/// No rows are returned in that case.
pub fn build_output_rows(
    response: &MatrixResponse,
    source_attributes: &[AttributeValue],
    destination_attributes: &[AttributeValue],
) -> Result<Vec<OutputRow>, MatrixError> {
    let rows = source_attributes.len();
    let cols = destination_attributes.len();
    check_shape("durations", &response.durations, rows, cols)?;
    check_shape("distances", &response.distances, rows, cols)?;

    let mut output = Vec::with_capacity(rows * cols);
    for ((from_id, durations), distances) in source_attributes
        .iter()
        .zip(&response.durations)
        .zip(&response.distances)
    {
        for ((to_id, duration), distance) in destination_attributes
            .iter()
            .zip(durations)
            .zip(distances)
        {
            output.push(OutputRow {
                from_id: from_id.clone(),
                to_id: to_id.clone(),
                duration_hours: duration.map(|secs| secs / SECONDS_PER_HOUR),
                distance_km: distance.map(|metres| metres / METRES_PER_KILOMETRE),
            });
        }
    }
    Ok(output)
}

fn check_shape(
    name: &str,
    matrix: &[Vec<Option<f64>>],
    rows: usize,
    cols: usize,
) -> Result<(), MatrixError> {
    if matrix.len() != rows {
        return Err(MatrixError::MalformedResponse {
            reason: format!("{name} has {} rows, expected {rows}", matrix.len()),
        });
    }
    if let Some((index, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != cols) {
        return Err(MatrixError::MalformedResponse {
            reason: format!(
                "{name} row {index} has {} cells, expected {cols}",
                row.len()
            ),
        });
    }
    Ok(())
}
