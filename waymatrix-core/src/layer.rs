//! Host-facing point layers, their fields and attribute values.

use std::collections::HashMap;
use std::fmt;

use geo::Point;
use serde::Serialize;

use crate::crs::Crs;

/// Opaque handle a host uses to identify a layer.
///
/// Two layers are the same layer exactly when their ids are equal. The
/// features behind the handle are never compared.
///
/// # Examples
/// ```
/// use waymatrix_core::LayerId;
///
/// let left = LayerId::new("stops.geojson");
/// assert_eq!(left, LayerId::new("stops.geojson"));
/// assert_ne!(left, LayerId::new("./stops.geojson"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(String);

impl LayerId {
    /// Wrap a host-provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared geometry type of a point layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// One point per feature.
    Point,
    /// Several points per feature; rejected by the matrix algorithm.
    MultiPoint,
}

impl GeometryKind {
    /// Return `true` for multi-part geometries.
    pub const fn is_multi(self) -> bool {
        matches!(self, Self::MultiPoint)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Point => "Point",
            Self::MultiPoint => "MultiPoint",
        })
    }
}

/// Attribute types an ID field may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Signed 64-bit integers.
    Integer,
    /// Double-precision floats.
    Double,
    /// UTF-8 text.
    String,
}

/// Name and type of a layer field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Field name as exposed by the host.
    pub name: String,
    /// Type of the values stored in the field.
    pub field_type: FieldType,
}

impl FieldDescriptor {
    /// Construct a descriptor.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A single attribute value read from a feature.
///
/// Serialises untagged so JSON output carries the bare value.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Missing or null value.
    #[default]
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Double(f64),
    /// Text value.
    String(String),
}

impl AttributeValue {
    /// Return `true` when the value is [`AttributeValue::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for AttributeValue {
    /// Nulls render as an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// A feature of a point layer, in the layer's own CRS.
///
/// # Examples
/// ```
/// use geo::Point;
/// use waymatrix_core::{AttributeValue, PointFeature};
///
/// let feature = PointFeature::new(Point::new(4.35, 50.85)).with_attribute("id", "A");
/// assert_eq!(feature.attribute("id"), AttributeValue::from("A"));
/// assert!(feature.attribute("name").is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    /// Point geometry, untransformed.
    pub geometry: Point<f64>,
    /// Attribute values keyed by field name.
    pub attributes: HashMap<String, AttributeValue>,
}

impl PointFeature {
    /// Construct a feature without attributes.
    pub fn new(geometry: Point<f64>) -> Self {
        Self {
            geometry,
            attributes: HashMap::new(),
        }
    }

    /// Add an attribute while returning `self` for chaining.
    #[must_use]
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Return the value stored under `name`, or null when absent.
    pub fn attribute(&self, name: &str) -> AttributeValue {
        self.attributes.get(name).cloned().unwrap_or_default()
    }
}

/// A point layer supplied by the host.
///
/// Implementations are read-only for the duration of one invocation.
pub trait PointLayer {
    /// Identity handle used for the same-layer check.
    fn id(&self) -> &LayerId;

    /// All features, in layer order.
    fn features(&self) -> Vec<PointFeature>;

    /// Number of features the layer reports.
    fn feature_count(&self) -> usize;

    /// Declared geometry type.
    fn geometry_kind(&self) -> GeometryKind;

    /// Coordinate reference system of the feature geometries.
    fn crs(&self) -> &Crs;

    /// Look up a field by name.
    fn field(&self, name: &str) -> Option<FieldDescriptor>;
}
