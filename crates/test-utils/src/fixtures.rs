//! Upstream API response fixtures.
//!
//! Each builder returns the JSON document the open-data API would return
//! for the corresponding endpoint, trimmed to the members the provider reads
//! plus a few realistic extras.

use serde_json::{json, Value};

/// Common coordinate rings for testing.
pub mod rings {
    /// Closed ring roughly covering San Francisco.
    pub const SAN_FRANCISCO: [[f64; 2]; 5] = [
        [-122.514, 37.708],
        [-122.357, 37.708],
        [-122.357, 37.832],
        [-122.514, 37.832],
        [-122.514, 37.708],
    ];

    /// Single vertex.
    pub const SINGLE_POINT: [[f64; 2]; 1] = [[5.0, 5.0]];

    /// Open triangle.
    pub const TRIANGLE: [[f64; 2]; 3] = [[0.0, 0.0], [2.0, 3.0], [-1.0, 4.0]];
}

/// Dataset descriptor (`/api/views/{id}.json`) with no indirection.
pub fn descriptor(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Dataset {}", id),
        "assetType": "dataset",
        "viewType": "tabular"
    })
}

/// Descriptor of a parent dataset exposing child views.
pub fn descriptor_with_child_views(id: &str, children: &[&str]) -> Value {
    let mut body = descriptor(id);
    body["assetType"] = json!("map");
    body["childViews"] = json!(children);
    body
}

/// Descriptor of a child dataset whose metadata lives on a geo parent.
pub fn descriptor_with_geo_parent(id: &str, parent: &str) -> Value {
    let mut body = descriptor(id);
    body["privateMetadata"] = json!({
        "geo": { "parentUid": parent, "owsUrl": format!("/api/geospatial/{}", parent) }
    });
    body
}

/// Column listing (`/api/views.json?method=getByResourceName`).
pub fn column_listing(columns: &[(&str, &str)]) -> Value {
    let columns: Vec<Value> = columns
        .iter()
        .enumerate()
        .map(|(i, (field, type_name))| {
            json!({
                "id": 1000 + i,
                "name": field.to_uppercase(),
                "fieldName": field,
                "dataTypeName": type_name,
                "position": i + 1
            })
        })
        .collect();
    json!({ "id": "resource", "columns": columns })
}

/// Descriptive metadata (`/api/views/metadata/v1/{id}.json`).
pub fn descriptive_metadata(name: &str, description: &str, license: Option<&str>) -> Value {
    let mut body = json!({
        "id": "meta",
        "name": name,
        "description": description,
        "category": "Geographic Locations and Boundaries"
    });
    if let Some(license) = license {
        body["license"] = json!(license);
    }
    body
}

/// Migration record (`/api/migrations/{id}.json`).
pub fn migration_record(obe_id: &str, nbe_id: &str) -> Value {
    json!({
        "obeId": obe_id,
        "nbeId": nbe_id,
        "syncedAt": 1_500_000_000
    })
}

/// Point feature carrying a record id.
pub fn point_feature(record_id: &str, lon: f64, lat: f64) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [lon, lat] },
        "properties": { ":id": record_id, "name": format!("feature {}", record_id) }
    })
}

/// FeatureCollection of `count` point features.
pub fn feature_collection(count: usize) -> Value {
    let features: Vec<Value> = (0..count)
        .map(|i| point_feature(&format!("row-{}", i), -122.4 + i as f64 * 0.01, 37.7))
        .collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
        "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:OGC:1.3:CRS84" } }
    })
}

/// Extent probe response: one feature whose geometry is a multipolygon
/// with `ring` as its first outer ring.
pub fn extent_response(field: &str, ring: &[[f64; 2]]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": { "type": "MultiPolygon", "coordinates": [[ring]] },
            "properties": { "field": field }
        }]
    })
}

/// Extent probe response with a plain polygon geometry.
pub fn polygon_extent_response(ring: &[[f64; 2]]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [ring] },
            "properties": {}
        }]
    })
}
