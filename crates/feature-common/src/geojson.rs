//! GeoJSON FeatureCollection with a feature-service metadata envelope.
//!
//! Features are kept as raw JSON: a provider passes upstream features
//! through unchanged and only adds the `metadata` member. Unknown top-level
//! members (e.g. `crs`) are preserved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bbox::BoundingBox;

/// Unique identifier field advertised for every layer.
pub const ID_FIELD: &str = ":id";

/// A GeoJSON FeatureCollection, optionally carrying layer metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type", default = "feature_collection_type")]
    pub type_: String,

    /// Array of features, untouched.
    #[serde(default)]
    pub features: Vec<Value>,

    /// Layer metadata, attached only after a successful metadata fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataEnvelope>,

    /// Any other top-level members of the upstream document.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: feature_collection_type(),
            features: Vec::new(),
            metadata: None,
            extra: Map::new(),
        }
    }

    /// Add features to the collection.
    pub fn with_features(mut self, features: Vec<Value>) -> Self {
        self.features.extend(features);
        self
    }

    /// Attach a metadata envelope, replacing any existing one.
    pub fn with_metadata(mut self, metadata: MetadataEnvelope) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// Layer metadata understood by feature-service consumers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEnvelope {
    /// Unique identifier field.
    pub id_field: String,

    /// The name of the layer.
    pub name: Option<String>,

    /// The description of the layer.
    pub description: Option<String>,

    /// Licensing statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright_text: Option<String>,

    /// Layer extent as `[[minX, minY], [maxX, maxY]]`, null when unknown.
    pub extent: Option<BoundingBox>,

    /// Maximum number of features returned per request, if capped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_record_count: Option<u64>,
}

impl MetadataEnvelope {
    /// Create an envelope with the standard id field and no extent.
    pub fn new(name: Option<String>, description: Option<String>) -> Self {
        Self {
            id_field: ID_FIELD.to_string(),
            name,
            description,
            copyright_text: None,
            extent: None,
            max_record_count: None,
        }
    }

    pub fn with_copyright(mut self, copyright_text: impl Into<String>) -> Self {
        self.copyright_text = Some(copyright_text.into());
        self
    }

    pub fn with_extent(mut self, extent: Option<BoundingBox>) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_max_record_count(mut self, max_record_count: Option<u64>) -> Self {
        self.max_record_count = max_record_count;
        self
    }
}
