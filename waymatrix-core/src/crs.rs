//! Coordinate reference systems and reprojection to WGS84.
//!
//! Routing services expect `[longitude, latitude]` pairs. Layers may declare
//! another CRS, so every geometry passes through a [`Reproject`] built by a
//! [`CrsTransformer`] for the layer's [`Crs`].

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use geo::{Coord, Point};
use thiserror::Error;

/// Sphere radius used by the Web Mercator projection, in metres.
const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

const AUTHID_WGS84: &str = "EPSG:4326";
const AUTHID_CRS84: &str = "OGC:CRS84";
const AUTHID_WEB_MERCATOR: &str = "EPSG:3857";
const AUTHID_GOOGLE_MERCATOR: &str = "EPSG:900913";

/// Errors raised while naming or transforming a CRS.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrsError {
    /// The name is not a recognisable authority identifier.
    #[error("invalid coordinate reference system name '{name}'")]
    Invalid {
        /// The rejected name.
        name: String,
    },
    /// No transformation to WGS84 is available.
    #[error("no transformation from {authid} to EPSG:4326 is available")]
    Unsupported {
        /// Normalised authority id of the source CRS.
        authid: String,
    },
}

/// A coordinate reference system identified by `AUTHORITY:CODE`.
///
/// # Examples
/// ```
/// use waymatrix_core::Crs;
///
/// let crs = Crs::parse("urn:ogc:def:crs:EPSG::3857")?;
/// assert_eq!(crs.authid(), "EPSG:3857");
/// assert!(Crs::wgs84().is_geographic_wgs84());
/// # Ok::<(), waymatrix_core::CrsError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crs {
    authid: String,
}

impl Crs {
    /// WGS84 longitude/latitude.
    pub fn wgs84() -> Self {
        Self {
            authid: AUTHID_WGS84.to_owned(),
        }
    }

    /// Parse an `EPSG:n`, OGC URN or `CRS84` name.
    pub fn parse(name: &str) -> Result<Self, CrsError> {
        let invalid = || CrsError::Invalid {
            name: name.to_owned(),
        };
        let upper = name.trim().to_ascii_uppercase();
        if upper == "CRS84" {
            return Ok(Self {
                authid: AUTHID_CRS84.to_owned(),
            });
        }

        let (authority, code) = split_authority(&upper).ok_or_else(invalid)?;
        if authority.is_empty() || code.is_empty() || code.contains(':') {
            return Err(invalid());
        }
        if authority == "EPSG" && code.parse::<u32>().is_err() {
            return Err(invalid());
        }
        Ok(Self {
            authid: format!("{authority}:{code}"),
        })
    }

    /// Normalised `AUTHORITY:CODE` identifier.
    pub fn authid(&self) -> &str {
        &self.authid
    }

    /// Return `true` when coordinates are already WGS84 longitude/latitude.
    pub fn is_geographic_wgs84(&self) -> bool {
        matches!(self.authid.as_str(), AUTHID_WGS84 | AUTHID_CRS84)
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authid)
    }
}

fn split_authority(upper: &str) -> Option<(&str, &str)> {
    // urn:ogc:def:crs:AUTHORITY:[VERSION]:CODE
    if let Some(rest) = upper.strip_prefix("URN:OGC:DEF:CRS:") {
        let authority = rest.split(':').next()?;
        let code = rest.rsplit(':').next()?;
        return Some((authority, code));
    }
    upper.split_once(':')
}

/// Maps a point in some CRS to WGS84 longitude/latitude.
pub trait Reproject {
    /// Reproject a single point.
    fn reproject(&self, point: Point<f64>) -> Coord<f64>;
}

/// Builds reprojections from a layer CRS to WGS84.
pub trait CrsTransformer {
    /// Return a reprojection from `crs` to WGS84.
    fn to_wgs84(&self, crs: &Crs) -> Result<Box<dyn Reproject>, CrsError>;
}

/// Transformer covering WGS84 and spherical Web Mercator.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTransformer;

impl CrsTransformer for BuiltinTransformer {
    fn to_wgs84(&self, crs: &Crs) -> Result<Box<dyn Reproject>, CrsError> {
        match crs.authid() {
            AUTHID_WGS84 | AUTHID_CRS84 => Ok(Box::new(BuiltinReprojection::Identity)),
            AUTHID_WEB_MERCATOR | AUTHID_GOOGLE_MERCATOR => {
                Ok(Box::new(BuiltinReprojection::SphericalMercator))
            }
            other => Err(CrsError::Unsupported {
                authid: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuiltinReprojection {
    Identity,
    SphericalMercator,
}

impl Reproject for BuiltinReprojection {
    fn reproject(&self, point: Point<f64>) -> Coord<f64> {
        match self {
            Self::Identity => point.into(),
            Self::SphericalMercator => {
                let lon = (point.x() / WEB_MERCATOR_RADIUS_M).to_degrees();
                let lat = (2.0 * (point.y() / WEB_MERCATOR_RADIUS_M).exp().atan() - FRAC_PI_2)
                    .to_degrees();
                Coord { x: lon, y: lat }
            }
        }
    }
}
