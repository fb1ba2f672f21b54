//! Common types shared by feature-service providers.
//!
//! A provider answers a feature-service query with a GeoJSON
//! `FeatureCollection` carrying a `metadata` envelope (layer name,
//! description, copyright, id field and extent). The types here model that
//! response without interpreting the features themselves.

pub mod bbox;
pub mod error;
pub mod geojson;
pub mod geometry;

pub use bbox::BoundingBox;
pub use error::{FeatureError, FeatureResult};
pub use geojson::{FeatureCollection, MetadataEnvelope, ID_FIELD};
pub use geometry::GeometryType;
