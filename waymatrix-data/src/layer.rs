//! GeoJSON point layers.
//!
//! A [`GeoJsonLayer`] reads a `FeatureCollection` of `Point` or `MultiPoint`
//! features and exposes it through [`PointLayer`]. Field types are inferred
//! from the property values of every feature. Any `MultiPoint`, empty ones
//! included, marks the layer as [`GeometryKind::MultiPoint`] so matrix
//! validation rejects it.

use std::collections::HashMap;
use std::str::FromStr;

use camino::Utf8Path;
use geo::Point;
use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue, Value};
use thiserror::Error;
use waymatrix_core::{
    AttributeValue, Crs, CrsError, FieldDescriptor, FieldType, GeometryKind, LayerId,
    PointFeature, PointLayer,
};

/// Errors raised while loading a GeoJSON layer.
#[derive(Debug, Error)]
pub enum LayerLoadError {
    /// The file could not be read.
    #[error("failed to read layer file {path}")]
    Read {
        /// Path of the layer file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The text is not valid GeoJSON.
    #[error("failed to parse GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
    /// The document is a lone geometry or feature.
    #[error("expected a GeoJSON FeatureCollection but found a {found}")]
    NotFeatureCollection {
        /// Top-level object type.
        found: &'static str,
    },
    /// A feature has no geometry.
    #[error("feature {index} has no geometry")]
    MissingGeometry {
        /// Zero-based feature position.
        index: usize,
    },
    /// A feature is neither a point nor a multi-point.
    #[error("feature {index} has a {found} geometry; only points are supported")]
    UnsupportedGeometry {
        /// Zero-based feature position.
        index: usize,
        /// GeoJSON geometry type.
        found: String,
    },
    /// A position has fewer than two ordinates, or a multi-point is empty.
    #[error("feature {index} has an invalid position")]
    InvalidPosition {
        /// Zero-based feature position.
        index: usize,
    },
    /// The legacy `crs` member names an unusable CRS.
    #[error("invalid layer CRS: {0}")]
    Crs(#[from] CrsError),
}

/// A point layer read from GeoJSON.
#[derive(Debug, Clone)]
pub struct GeoJsonLayer {
    id: LayerId,
    features: Vec<PointFeature>,
    fields: Vec<FieldDescriptor>,
    kind: GeometryKind,
    crs: Crs,
}

impl GeoJsonLayer {
    /// Load the layer stored at `path`, identified by `id`.
    ///
    /// # Errors
    /// Returns [`LayerLoadError`] when the file cannot be read or is not a
    /// collection of point features.
    pub fn from_path(id: LayerId, path: &Utf8Path) -> Result<Self, LayerLoadError> {
        let text =
            waymatrix_fs::read_utf8_to_string(path).map_err(|source| LayerLoadError::Read {
                path: path.to_string(),
                source,
            })?;
        Self::from_geojson_str(id, &text)
    }

    /// Parse a layer from GeoJSON text.
    ///
    /// # Errors
    /// Returns [`LayerLoadError`] when the text is not a collection of point
    /// features.
    ///
    /// # Examples
    /// ```
    /// use waymatrix_core::{FieldType, LayerId, PointLayer};
    /// use waymatrix_data::GeoJsonLayer;
    ///
    /// let layer = GeoJsonLayer::from_geojson_str(
    ///     LayerId::new("stops"),
    ///     r#"{"type": "FeatureCollection", "features": [
    ///         {"type": "Feature", "properties": {"id": 1},
    ///          "geometry": {"type": "Point", "coordinates": [4.35, 50.85]}}
    ///     ]}"#,
    /// )?;
    /// assert_eq!(layer.feature_count(), 1);
    /// assert_eq!(layer.field("id").map(|f| f.field_type), Some(FieldType::Integer));
    /// # Ok::<(), waymatrix_data::LayerLoadError>(())
    /// ```
    pub fn from_geojson_str(id: LayerId, text: &str) -> Result<Self, LayerLoadError> {
        match GeoJson::from_str(text)? {
            GeoJson::FeatureCollection(collection) => Self::from_collection(id, collection),
            GeoJson::Feature(_) => Err(LayerLoadError::NotFeatureCollection { found: "Feature" }),
            GeoJson::Geometry(_) => Err(LayerLoadError::NotFeatureCollection { found: "Geometry" }),
        }
    }

    fn from_collection(id: LayerId, collection: FeatureCollection) -> Result<Self, LayerLoadError> {
        let crs = legacy_crs(collection.foreign_members.as_ref())?;
        let mut kind = GeometryKind::Point;
        let mut inference = FieldInference::default();
        let mut features = Vec::with_capacity(collection.features.len());

        for (index, feature) in collection.features.into_iter().enumerate() {
            let geometry = feature
                .geometry
                .ok_or(LayerLoadError::MissingGeometry { index })?;
            let point = match geometry.value {
                Value::Point(position) => to_point(&position, index)?,
                Value::MultiPoint(positions) => {
                    kind = GeometryKind::MultiPoint;
                    // An empty multi-point has no location but still marks the layer.
                    let Some(first) = positions.first() else {
                        continue;
                    };
                    to_point(first, index)?
                }
                other => {
                    return Err(LayerLoadError::UnsupportedGeometry {
                        index,
                        found: other.type_name().to_owned(),
                    });
                }
            };

            let attributes = feature
                .properties
                .map(|properties| inference.observe(properties))
                .unwrap_or_default();
            features.push(PointFeature { geometry: point, attributes });
        }

        Ok(Self {
            id,
            features,
            fields: inference.into_fields(),
            kind,
            crs,
        })
    }

    /// Field descriptors in first-seen order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

impl PointLayer for GeoJsonLayer {
    fn id(&self) -> &LayerId {
        &self.id
    }

    fn features(&self) -> Vec<PointFeature> {
        self.features.clone()
    }

    fn feature_count(&self) -> usize {
        self.features.len()
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

fn to_point(position: &[f64], index: usize) -> Result<Point<f64>, LayerLoadError> {
    match position {
        [x, y, ..] => Ok(Point::new(*x, *y)),
        _ => Err(LayerLoadError::InvalidPosition { index }),
    }
}

/// Read `{"crs": {"type": "name", "properties": {"name": ...}}}`.
fn legacy_crs(members: Option<&JsonObject>) -> Result<Crs, LayerLoadError> {
    let name = members
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|properties| properties.get("name"))
        .and_then(JsonValue::as_str);
    match name {
        Some(name) => Ok(Crs::parse(name)?),
        None => Ok(Crs::wgs84()),
    }
}

/// Widest type seen for one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Observed {
    Unknown,
    Integer,
    Double,
    String,
}

impl Observed {
    fn widen(self, value: &JsonValue) -> Self {
        let seen = match value {
            JsonValue::Null => return self,
            JsonValue::Number(number) if number.is_i64() => Self::Integer,
            JsonValue::Number(_) => Self::Double,
            _ => Self::String,
        };
        match (self, seen) {
            (Self::String, _) | (_, Self::String) => Self::String,
            (Self::Double, _) | (_, Self::Double) => Self::Double,
            _ => Self::Integer,
        }
    }

    fn field_type(self) -> FieldType {
        match self {
            Self::Integer => FieldType::Integer,
            Self::Double => FieldType::Double,
            Self::String | Self::Unknown => FieldType::String,
        }
    }
}

#[derive(Debug, Default)]
struct FieldInference {
    order: Vec<String>,
    observed: HashMap<String, Observed>,
}

impl FieldInference {
    fn observe(&mut self, properties: JsonObject) -> HashMap<String, AttributeValue> {
        properties
            .into_iter()
            .map(|(name, value)| {
                let slot = self.observed.entry(name.clone()).or_insert_with(|| {
                    self.order.push(name.clone());
                    Observed::Unknown
                });
                *slot = slot.widen(&value);
                let attribute = to_attribute(value);
                (name, attribute)
            })
            .collect()
    }

    fn into_fields(self) -> Vec<FieldDescriptor> {
        self.order
            .into_iter()
            .map(|name| {
                let field_type = self
                    .observed
                    .get(&name)
                    .copied()
                    .unwrap_or(Observed::Unknown)
                    .field_type();
                FieldDescriptor::new(name, field_type)
            })
            .collect()
    }
}

fn to_attribute(value: JsonValue) -> AttributeValue {
    match value {
        JsonValue::Null => AttributeValue::Null,
        JsonValue::Bool(flag) => AttributeValue::String(flag.to_string()),
        JsonValue::Number(number) => number.as_i64().map_or_else(
            || AttributeValue::Double(number.as_f64().unwrap_or(f64::NAN)),
            AttributeValue::Integer,
        ),
        JsonValue::String(text) => AttributeValue::String(text),
        other => AttributeValue::String(other.to_string()),
    }
}
