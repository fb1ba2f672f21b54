//! Upstream open-data API access.
//!
//! [`SocrataApi`] is the transport seam: everything above it works on parsed
//! JSON and [`ApiError`] statuses, so the pipeline can be driven by the
//! reqwest-backed [`HttpClient`] or by a test double.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};

/// Transport-level failure of a single upstream call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Upstream answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Connection, TLS, timeout or body read failure.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Body was not the JSON document we expected.
    #[error("Invalid response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status of the failure, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Read access to the upstream API.
#[async_trait]
pub trait SocrataApi: Send + Sync {
    /// GET a URL and parse the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value, ApiError>;
}

/// GET a URL and deserialize the body into `T`.
pub async fn get_typed<A, T>(api: &A, url: &str) -> Result<T, ApiError>
where
    A: SocrataApi + ?Sized,
    T: DeserializeOwned,
{
    let value = api.get_json(url).await?;
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// reqwest-backed transport with compressed responses.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .gzip(true)
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ProviderError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SocrataApi for HttpClient {
    #[instrument(skip(self))]
    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Upstream returned error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Request-scoped upstream host and the URLs it serves.
///
/// Hosts named by a request must be a bare `domain[:port]` and are always
/// reached over https. The configured default may carry its own scheme.
/// Ids, field names and query values are percent-encoded before they are
/// interpolated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetHost {
    base_url: String,
}

impl DatasetHost {
    /// Host from trusted configuration; a value with a scheme is kept as is.
    pub fn new(host: &str) -> Self {
        let host = host.trim().trim_end_matches('/');
        let base_url = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        Self { base_url }
    }

    /// Host supplied by a request.
    pub fn from_request(host: &str) -> ProviderResult<Self> {
        let host = host.trim();
        if !is_bare_host(host) {
            return Err(ProviderError::invalid_query(
                "host",
                format!("'{}' is not a bare domain name", host),
            ));
        }
        Ok(Self {
            base_url: format!("https://{}", host.to_ascii_lowercase()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Dataset descriptor: child views and geo parent linkage.
    pub fn view_url(&self, id: &str) -> String {
        format!("{}/api/views/{}.json", self.base_url, encode(id))
    }

    /// GeoJSON feature data; `query_string` must already be encoded.
    pub fn resource_url(&self, id: &str, query_string: &str) -> String {
        format!(
            "{}/resource/{}.geojson?{}",
            self.base_url,
            encode(id),
            query_string
        )
    }

    /// Column listing for a resource.
    pub fn columns_url(&self, id: &str) -> String {
        format!(
            "{}/api/views.json?method=getByResourceName&name={}",
            self.base_url,
            encode(id)
        )
    }

    /// Descriptive metadata: name, description, license.
    pub fn metadata_url(&self, id: &str) -> String {
        format!("{}/api/views/metadata/v1/{}.json", self.base_url, encode(id))
    }

    /// Extent probe over one geometry field.
    pub fn extent_url(&self, id: &str, geometry_field: &str) -> String {
        let select = format!("extent({})", geometry_field);
        self.resource_url(id, &format!("$select={}", encode(&select)))
    }

    /// Migration record mapping a legacy id to its current id.
    pub fn migration_url(&self, id: &str) -> String {
        format!("{}/api/migrations/{}.json", self.base_url, encode(id))
    }
}

/// `domain[:port]` with dot-separated alphanumeric/hyphen labels.
fn is_bare_host(host: &str) -> bool {
    let (name, port) = match host.rsplit_once(':') {
        Some((name, port)) => (name, Some(port)),
        None => (host, None),
    };
    let name_ok = !name.is_empty()
        && name.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    let port_ok = port.map_or(true, |p| p.parse::<u16>().is_ok());
    name_ok && port_ok
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
