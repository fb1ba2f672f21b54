//! Error types surfaced to the caller of the provider.

use thiserror::Error;

use crate::api::ApiError;

/// Result type alias using ProviderError.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Terminal failures of a data request.
///
/// Enrichment failures (descriptive metadata, extent) never become a
/// `ProviderError`; they only remove the corresponding field from the result.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The dataset id could not be resolved or has no data on this host.
    #[error("404 - Dataset for id {id} not found on this domain")]
    NotFound { id: String },

    /// Any upstream failure other than 400/404.
    #[error("{} - Unexpected problem, cannot reach server", status_label(.status))]
    Unreachable { status: Option<u16> },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidQuery { param: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "unknown".to_string(), |s| s.to_string())
}

impl ProviderError {
    pub fn not_found(id: impl Into<String>) -> Self {
        ProviderError::NotFound { id: id.into() }
    }

    /// Wrap an upstream failure, keeping its status code if it had one.
    pub fn unreachable(err: &ApiError) -> Self {
        ProviderError::Unreachable {
            status: err.status(),
        }
    }

    pub fn invalid_query(param: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::InvalidQuery {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code a host framework should answer with.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ProviderError::NotFound { .. } => 404,
            ProviderError::Unreachable { .. } => 502,
            ProviderError::InvalidQuery { .. } => 400,
            ProviderError::Config(_) => 500,
        }
    }
}
