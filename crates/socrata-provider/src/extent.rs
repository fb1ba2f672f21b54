//! Layer extent from the upstream extent function.
//!
//! The probe asks upstream for `extent(field)` and folds the first ring of
//! the first returned feature into a bounding box. This is the box of that
//! one ring, not a union over every returned feature. Existing clients
//! depend on exactly this value.

use feature_common::{BoundingBox, FeatureError, FeatureResult};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::api::{ApiError, DatasetHost, SocrataApi};

#[derive(Debug, Error)]
pub enum ExtentError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Geometry(#[from] FeatureError),
}

/// Compute the extent of `data_id` over its geometry column.
///
/// With no geometry column the extent is `None` and nothing is requested.
#[instrument(skip(api, host))]
pub async fn compute_extent<A>(
    api: &A,
    host: &DatasetHost,
    data_id: &str,
    geometry_field: Option<&str>,
) -> Result<Option<BoundingBox>, ExtentError>
where
    A: SocrataApi + ?Sized,
{
    let Some(field) = geometry_field else {
        debug!("No geometry field, skipping extent");
        return Ok(None);
    };

    let body = api.get_json(&host.extent_url(data_id, field)).await?;
    let extent = extent_from_response(&body)?;
    debug!(?extent, "Computed extent");
    Ok(Some(extent))
}

/// Bounding box of a coordinate ring; `None` for an empty ring.
pub fn compute_ring_extent(ring: &[[f64; 2]]) -> Option<BoundingBox> {
    BoundingBox::from_ring(ring)
}

/// Fold the first ring of the first feature of an extent response.
pub fn extent_from_response(body: &Value) -> FeatureResult<BoundingBox> {
    let geometry = body
        .pointer("/features/0/geometry")
        .filter(|g| !g.is_null())
        .ok_or_else(|| FeatureError::InvalidCoordinates("response has no feature geometry".to_string()))?;

    let ring = outer_ring(geometry)?;
    compute_ring_extent(&ring).ok_or(FeatureError::EmptyRing)
}

/// First ring of a Polygon (`coordinates[0]`) or MultiPolygon (`coordinates[0][0]`).
fn outer_ring(geometry: &Value) -> FeatureResult<Vec<[f64; 2]>> {
    let geometry_type = geometry.get("type").and_then(Value::as_str).unwrap_or("");
    let pointer = match geometry_type {
        "Polygon" => "/coordinates/0",
        "MultiPolygon" => "/coordinates/0/0",
        other => return Err(FeatureError::UnsupportedGeometry(other.to_string())),
    };

    let ring = geometry
        .pointer(pointer)
        .and_then(Value::as_array)
        .ok_or_else(|| FeatureError::InvalidCoordinates(format!("no ring at {}", pointer)))?;

    ring.iter().map(position).collect()
}

/// A GeoJSON position; any coordinates past x and y are ignored.
fn position(value: &Value) -> FeatureResult<[f64; 2]> {
    let coords = value
        .as_array()
        .ok_or_else(|| FeatureError::InvalidCoordinates(format!("not a position: {}", value)))?;
    match (
        coords.first().and_then(Value::as_f64),
        coords.get(1).and_then(Value::as_f64),
    ) {
        (Some(x), Some(y)) => Ok([x, y]),
        _ => Err(FeatureError::InvalidCoordinates(format!("not a position: {}", value))),
    }
}
