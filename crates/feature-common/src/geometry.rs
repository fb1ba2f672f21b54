//! Geometry column types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geometry column types a dataset may declare.
///
/// Names follow the upstream column `dataTypeName` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    Point,
    Line,
    Polygon,
    MultiPoint,
    MultiLine,
    MultiPolygon,
}

impl GeometryType {
    pub const ALL: [GeometryType; 6] = [
        GeometryType::Point,
        GeometryType::Line,
        GeometryType::Polygon,
        GeometryType::MultiPoint,
        GeometryType::MultiLine,
        GeometryType::MultiPolygon,
    ];

    /// The upstream type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Point => "point",
            GeometryType::Line => "line",
            GeometryType::Polygon => "polygon",
            GeometryType::MultiPoint => "multipoint",
            GeometryType::MultiLine => "multiline",
            GeometryType::MultiPolygon => "multipolygon",
        }
    }

    /// Check whether a column type name denotes geometry.
    pub fn is_geometry(type_name: &str) -> bool {
        type_name.parse::<GeometryType>().is_ok()
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeometryType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("not a geometry type: {}", s))
    }
}
