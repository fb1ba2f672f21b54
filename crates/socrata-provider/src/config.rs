//! Provider configuration.
//!
//! Loaded from a YAML file or from the environment. The configuration is
//! read-only once a [`Model`](crate::Model) is built; per-request hosts never
//! modify it.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Host used when a request does not name one.
pub const DEFAULT_HOST: &str = "data.sfgov.org";

/// Organization named in the copyright text of every layer.
pub const DEFAULT_ORGANIZATION: &str = "the City and County of San Francisco";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Open-data domain queried when the request carries no host.
    pub default_host: String,
    /// Data publisher, used for `copyrightText`.
    pub organization: String,
    /// Total timeout per upstream request.
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    /// Advertised per-request feature cap, if any.
    pub max_record_count: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default_host: DEFAULT_HOST.to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("socrata-provider/{}", env!("CARGO_PKG_VERSION")),
            max_record_count: None,
        }
    }
}

impl ProviderConfig {
    /// Load a configuration from a YAML file. Missing keys take defaults.
    pub fn load(path: &Path) -> ProviderResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: ProviderConfig = serde_yaml::from_str(&content).map_err(|e| {
            ProviderError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        debug!(path = %path.display(), host = %config.default_host, "Loaded provider config");
        Ok(config)
    }

    /// Defaults overridden by `SOCRATA_*` environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (the environment, in production).
    ///
    /// Recognised keys: `SOCRATA_DEFAULT_HOST`, `SOCRATA_ORGANIZATION`,
    /// `SOCRATA_TIMEOUT_SECS`.
    pub fn with_overrides<F>(mut self, lookup: F) -> ProviderResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SOCRATA_DEFAULT_HOST") {
            self.default_host = host;
        }
        if let Some(organization) = lookup("SOCRATA_ORGANIZATION") {
            self.organization = organization;
        }
        if let Some(timeout) = lookup("SOCRATA_TIMEOUT_SECS") {
            self.request_timeout_secs = timeout.trim().parse().map_err(|_| {
                ProviderError::Config(format!("SOCRATA_TIMEOUT_SECS is not a number: {}", timeout))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ProviderResult<()> {
        if self.default_host.trim().is_empty() {
            return Err(ProviderError::Config("default_host must not be empty".to_string()));
        }
        if self.organization.trim().is_empty() {
            return Err(ProviderError::Config("organization must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ProviderError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Licensing statement for a dataset published under `license`.
    pub fn copyright_text(&self, license: &str) -> String {
        format!("This data licensed by {} under {}", self.organization, license)
    }
}
