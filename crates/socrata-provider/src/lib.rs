//! Socrata open-data provider for feature services.
//!
//! Fetches a dataset from a Socrata domain and returns it as a GeoJSON
//! FeatureCollection carrying a layer metadata envelope (name, description,
//! copyright, id field, extent).
//!
//! Dataset ids are resolved through parent/child views and geo parents
//! before any data is fetched. A feature fetch answered with 400 is retried
//! once with the id found in the migration table.
//!
//! # Example
//!
//! ```no_run
//! use socrata_provider::{DataRequest, Model, ProviderConfig};
//!
//! # async fn run() -> socrata_provider::ProviderResult<()> {
//! let model = Model::from_config(ProviderConfig::default())?;
//! let collection = model.get_data(&DataRequest::new("tmnf-yvry")).await?;
//! println!("{} features", collection.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod extent;
pub mod metadata;
pub mod model;
pub mod provider;
pub mod query;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, DatasetHost, HttpClient, SocrataApi};
pub use config::ProviderConfig;
pub use error::{ProviderError, ProviderResult};
pub use model::Model;
pub use provider::{ProviderInfo, PROVIDER};
pub use query::{format_query, QuerySpec};
pub use resolver::{resolve, DatasetReference};
pub use types::{DataRequest, PathParams, QueryParams};
