//! Data orchestration: resolve ids, fetch features, enrich, retry once on
//! migrated ids.
//!
//! A request runs through these states:
//!
//! ```text
//! Resolving -> Fetching -> Success
//!                 |  400 (first time)  -> Retrying400 -> Fetching
//!                 |  400 (after retry) -> Retrying404
//!                 |  404               -> Retrying404 (terminal NotFound)
//!                 |  other             -> Failed      (terminal Unreachable)
//! ```

use std::sync::Arc;

use feature_common::FeatureCollection;
use futures::future::join;
use tracing::{debug, info, instrument, warn};

use crate::api::{get_typed, ApiError, DatasetHost, HttpClient, SocrataApi};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::extent::compute_extent;
use crate::metadata::{build_envelope, fetch_column_listing, fetch_descriptive, geometry_field};
use crate::query::QuerySpec;
use crate::resolver::{resolve, DatasetReference};
use crate::types::{DataRequest, MigrationRecord};

/// What a 400 on the feature fetch means for the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BadRequestPolicy {
    /// Look the id up in the migration table and fetch again.
    Migrate,
    /// The migration retry is spent; a 400 now means the dataset is missing.
    NotFound,
}

#[derive(Debug)]
enum FetchState {
    Resolving,
    Fetching {
        reference: DatasetReference,
        on_bad_request: BadRequestPolicy,
    },
    Retrying400 {
        reference: DatasetReference,
    },
    Retrying404 {
        id: String,
    },
    Failed {
        status: Option<u16>,
    },
    Success(FeatureCollection),
}

/// Provider model: turns a data request into an enriched FeatureCollection.
pub struct Model<A: SocrataApi> {
    api: Arc<A>,
    config: ProviderConfig,
}

impl Model<HttpClient> {
    /// Build a model talking to the real upstream over HTTP.
    pub fn from_config(config: ProviderConfig) -> ProviderResult<Self> {
        config.validate()?;
        let client = HttpClient::new(&config)?;
        Ok(Self::new(Arc::new(client), config))
    }
}

impl<A: SocrataApi> Model<A> {
    pub fn new(api: Arc<A>, config: ProviderConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Host for this request: its own bare domain over https, or the
    /// configured default.
    pub fn host_for(&self, request: &DataRequest) -> ProviderResult<DatasetHost> {
        match request.params.host.as_deref().filter(|h| !h.trim().is_empty()) {
            Some(host) => DatasetHost::from_request(host),
            None => Ok(DatasetHost::new(&self.config.default_host)),
        }
    }

    /// Fetch the dataset named by `request` as GeoJSON with layer metadata.
    ///
    /// Metadata and extent failures degrade the result instead of failing
    /// it; the returned error is always `NotFound`, `Unreachable` or
    /// `InvalidQuery`.
    #[instrument(skip(self, request), fields(id = %request.params.id))]
    pub async fn get_data(&self, request: &DataRequest) -> ProviderResult<FeatureCollection> {
        let host = self.host_for(request)?;
        let query_string = QuerySpec::from_params(&request.query)?.to_query_string();
        let initial_id = request.params.id.as_str();

        let mut state = FetchState::Resolving;
        loop {
            debug!(state = state_name(&state), "Data request state");
            state = match state {
                FetchState::Resolving => FetchState::Fetching {
                    reference: resolve(self.api.as_ref(), &host, initial_id).await?,
                    on_bad_request: BadRequestPolicy::Migrate,
                },
                FetchState::Fetching {
                    reference,
                    on_bad_request,
                } => match self.fetch_and_merge(&reference, &query_string).await {
                    Ok(collection) => FetchState::Success(collection),
                    Err(err) => next_state(err, reference, on_bad_request),
                },
                FetchState::Retrying400 { reference } => {
                    let data_id = self.migrated_id(&reference).await?;
                    info!(from = %reference.data_id, to = %data_id, "Retrying with migrated id");
                    FetchState::Fetching {
                        reference: reference.with_data_id(data_id),
                        on_bad_request: BadRequestPolicy::NotFound,
                    }
                }
                FetchState::Retrying404 { id } => return Err(ProviderError::not_found(id)),
                FetchState::Failed { status } => return Err(ProviderError::Unreachable { status }),
                FetchState::Success(collection) => return Ok(collection),
            };
        }
    }

    /// Callback form of [`get_data`](Self::get_data): exactly one of the
    /// two arguments is `Some`.
    pub async fn get_data_with_callback<F>(&self, request: &DataRequest, callback: F)
    where
        F: FnOnce(Option<ProviderError>, Option<FeatureCollection>),
    {
        match self.get_data(request).await {
            Ok(collection) => callback(None, Some(collection)),
            Err(err) => callback(Some(err), None),
        }
    }

    /// Fetch features and columns together, then enrich.
    ///
    /// The feature fetch's failure wins over the column listing's, whichever
    /// finished first.
    async fn fetch_and_merge(
        &self,
        reference: &DatasetReference,
        query_string: &str,
    ) -> Result<FeatureCollection, ApiError> {
        let api = self.api.as_ref();
        let data_url = reference.host.resource_url(&reference.data_id, query_string);
        info!(url = %data_url, "Fetching features");

        let (collection, listing) = join(
            get_typed::<_, FeatureCollection>(api, &data_url),
            fetch_column_listing(api, &reference.host, &reference.data_id),
        )
        .await;
        let collection = collection?;
        let listing = listing?;

        let field = geometry_field(&listing);
        Ok(self.enrich(collection, reference, field.as_deref()).await)
    }

    /// Attach the metadata envelope, degrading on enrichment failures.
    async fn enrich(
        &self,
        collection: FeatureCollection,
        reference: &DatasetReference,
        geometry_field: Option<&str>,
    ) -> FeatureCollection {
        let api = self.api.as_ref();
        let (descriptive, extent) = join(
            fetch_descriptive(api, &reference.host, &reference.metadata_id),
            compute_extent(api, &reference.host, &reference.data_id, geometry_field),
        )
        .await;

        let descriptive = match descriptive {
            Ok(descriptive) => descriptive,
            Err(e) => {
                warn!(
                    metadata_id = %reference.metadata_id,
                    error = %e,
                    "Metadata request failed, returning data without metadata"
                );
                return collection;
            }
        };

        let extent = extent.unwrap_or_else(|e| {
            warn!(data_id = %reference.data_id, error = %e, "Extent request failed");
            None
        });

        collection.with_metadata(build_envelope(&self.config, descriptive, extent))
    }

    /// Look up the current id of a migrated dataset.
    async fn migrated_id(&self, reference: &DatasetReference) -> ProviderResult<String> {
        let url = reference.host.migration_url(&reference.data_id);
        match get_typed::<_, MigrationRecord>(self.api.as_ref(), &url).await {
            Ok(MigrationRecord {
                nbe_id: Some(nbe_id),
                ..
            }) if !nbe_id.is_empty() => Ok(nbe_id),
            Ok(_) => {
                warn!(data_id = %reference.data_id, "Migration record has no replacement id");
                Err(ProviderError::not_found(&reference.data_id))
            }
            Err(e) if e.is_not_found() => Err(ProviderError::not_found(&reference.data_id)),
            Err(e) => {
                warn!(data_id = %reference.data_id, error = %e, "Migration lookup failed");
                Err(ProviderError::unreachable(&e))
            }
        }
    }
}

/// Failure table of the Fetching state.
fn next_state(err: ApiError, reference: DatasetReference, policy: BadRequestPolicy) -> FetchState {
    match (err.status(), policy) {
        (Some(400), BadRequestPolicy::Migrate) => {
            debug!(data_id = %reference.data_id, "Bad request, checking for a migrated id");
            FetchState::Retrying400 { reference }
        }
        (Some(400), BadRequestPolicy::NotFound) | (Some(404), _) => FetchState::Retrying404 {
            id: reference.data_id,
        },
        (status, _) => {
            warn!(data_id = %reference.data_id, error = %err, "Feature request failed");
            FetchState::Failed { status }
        }
    }
}

fn state_name(state: &FetchState) -> &'static str {
    match state {
        FetchState::Resolving => "resolving",
        FetchState::Fetching { .. } => "fetching",
        FetchState::Retrying400 { .. } => "retrying_400",
        FetchState::Retrying404 { .. } => "retrying_404",
        FetchState::Failed { .. } => "failed",
        FetchState::Success(_) => "success",
    }
}
