//! Descriptive metadata and geometry column lookup.

use feature_common::{BoundingBox, MetadataEnvelope};
use tracing::{debug, instrument};

use crate::api::{get_typed, ApiError, DatasetHost, SocrataApi};
use crate::config::ProviderConfig;
use crate::types::{ColumnListing, DescriptiveMetadata};

/// Fetch name, description and license for a metadata id.
#[instrument(skip(api, host))]
pub async fn fetch_descriptive<A>(
    api: &A,
    host: &DatasetHost,
    metadata_id: &str,
) -> Result<DescriptiveMetadata, ApiError>
where
    A: SocrataApi + ?Sized,
{
    get_typed(api, &host.metadata_url(metadata_id)).await
}

/// Fetch the column listing for a data id.
pub async fn fetch_column_listing<A>(
    api: &A,
    host: &DatasetHost,
    data_id: &str,
) -> Result<ColumnListing, ApiError>
where
    A: SocrataApi + ?Sized,
{
    get_typed(api, &host.columns_url(data_id)).await
}

/// Fetch the name of the first geometry-typed column, if any.
pub async fn fetch_geometry_field<A>(
    api: &A,
    host: &DatasetHost,
    data_id: &str,
) -> Result<Option<String>, ApiError>
where
    A: SocrataApi + ?Sized,
{
    let listing = fetch_column_listing(api, host, data_id).await?;
    Ok(geometry_field(&listing))
}

/// Name of the first geometry-typed column in a listing.
pub fn geometry_field(listing: &ColumnListing) -> Option<String> {
    let field = listing.geometry_column().map(|c| c.field_name.clone());
    debug!(field = ?field, columns = listing.columns.len(), "Selected geometry field");
    field
}

/// Assemble the layer metadata envelope.
///
/// Without a license there is nothing to attribute, so `copyrightText` is
/// left out.
pub fn build_envelope(
    config: &ProviderConfig,
    descriptive: DescriptiveMetadata,
    extent: Option<BoundingBox>,
) -> MetadataEnvelope {
    let DescriptiveMetadata {
        name,
        description,
        license,
    } = descriptive;

    let mut envelope = MetadataEnvelope::new(name, description)
        .with_extent(extent)
        .with_max_record_count(config.max_record_count);
    if let Some(license) = license.filter(|l| !l.trim().is_empty()) {
        envelope = envelope.with_copyright(config.copyright_text(&license));
    }
    envelope
}
