//! Dataset id resolution.
//!
//! A dataset id given by a client is not always the id that serves data or
//! metadata. A parent dataset delegates its queryable data to its first
//! child view; a child dataset delegates its descriptive metadata to its geo
//! parent. Both substitutions may apply to the same descriptor.

use tracing::{debug, info, instrument};

use crate::api::{get_typed, DatasetHost, SocrataApi};
use crate::error::{ProviderError, ProviderResult};
use crate::types::ViewDescriptor;

/// The two ids a request works with, plus the host that serves them.
///
/// Both ids are always present, even when they are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetReference {
    pub host: DatasetHost,
    /// Id queried for features and columns.
    pub data_id: String,
    /// Id queried for name, description and license.
    pub metadata_id: String,
}

impl DatasetReference {
    pub fn new(host: DatasetHost, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            host,
            data_id: id.clone(),
            metadata_id: id,
        }
    }

    /// Same reference with the data id replaced.
    pub fn with_data_id(&self, data_id: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
            ..self.clone()
        }
    }

    /// Apply the child-view and geo-parent substitutions of a descriptor.
    pub fn apply_descriptor(mut self, descriptor: &ViewDescriptor) -> Self {
        if let Some(child) = descriptor.first_child_view() {
            debug!(parent = %self.data_id, child = %child, "Using child view for data");
            self.data_id = child.to_string();
        }
        if let Some(parent) = descriptor.geo_parent() {
            debug!(child = %self.metadata_id, parent = %parent, "Using geo parent for metadata");
            self.metadata_id = parent.to_string();
        }
        self
    }
}

/// Resolve the data and metadata ids behind `initial_id`.
///
/// A 404 on the descriptor is `NotFound` for `initial_id`; any other failure
/// is `Unreachable`. Nothing is retried here.
#[instrument(skip(api, host), fields(host = %host.base_url()))]
pub async fn resolve<A>(
    api: &A,
    host: &DatasetHost,
    initial_id: &str,
) -> ProviderResult<DatasetReference>
where
    A: SocrataApi + ?Sized,
{
    let url = host.view_url(initial_id);
    let descriptor: ViewDescriptor = get_typed(api, &url).await.map_err(|e| {
        if e.is_not_found() {
            ProviderError::not_found(initial_id)
        } else {
            ProviderError::unreachable(&e)
        }
    })?;

    let reference = DatasetReference::new(host.clone(), initial_id).apply_descriptor(&descriptor);
    info!(
        id = %initial_id,
        data_id = %reference.data_id,
        metadata_id = %reference.metadata_id,
        "Resolved dataset ids"
    );
    Ok(reference)
}
