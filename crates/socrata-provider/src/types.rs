//! Request and upstream response types.

use feature_common::GeometryType;
use serde::{Deserialize, Serialize};

// ============================================================================
// Inbound request
// ============================================================================

/// A feature-service data request as handed over by the host framework.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRequest {
    pub params: PathParams,
    #[serde(default)]
    pub query: QueryParams,
}

impl DataRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            params: PathParams {
                id: id.into(),
                ..Default::default()
            },
            query: QueryParams::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.params.host = Some(host.into());
        self
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }
}

/// Path parameters: `/:host?/:id/FeatureServer/:layer/:method`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathParams {
    #[serde(default)]
    pub host: Option<String>,
    pub id: String,
    #[serde(default)]
    pub layer: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

/// Feature-service query parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(rename = "where", default)]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub result_offset: Option<String>,
    #[serde(default)]
    pub result_record_count: Option<String>,
    #[serde(default)]
    pub order_by_fields: Option<String>,
}

// ============================================================================
// Upstream responses
// ============================================================================

/// Dataset descriptor from `/api/views/{id}.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub child_views: Option<Vec<String>>,
    #[serde(default)]
    pub private_metadata: Option<PrivateMetadata>,
}

impl ViewDescriptor {
    /// First child view, which holds the queryable data of a parent dataset.
    pub fn first_child_view(&self) -> Option<&str> {
        self.child_views
            .as_ref()
            .and_then(|views| views.first())
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Geo parent, which holds the descriptive metadata of a child dataset.
    pub fn geo_parent(&self) -> Option<&str> {
        self.private_metadata
            .as_ref()
            .and_then(|m| m.geo.as_ref())
            .and_then(|g| g.parent_uid.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrivateMetadata {
    #[serde(default)]
    pub geo: Option<GeoMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoMetadata {
    #[serde(default)]
    pub parent_uid: Option<String>,
}

/// Column listing from `/api/views.json?method=getByResourceName`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnListing {
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl ColumnListing {
    /// First column whose declared type is a geometry type.
    pub fn geometry_column(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| GeometryType::is_geometry(&c.data_type_name))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub data_type_name: String,
}

/// Descriptive metadata from `/api/views/metadata/v1/{id}.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DescriptiveMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
}

/// Migration record from `/api/migrations/{id}.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRecord {
    #[serde(default)]
    pub obe_id: Option<String>,
    #[serde(default)]
    pub nbe_id: Option<String>,
}
