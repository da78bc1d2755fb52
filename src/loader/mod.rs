//! Configuration loader.
//!
//! Turns a [`ConfigReference`] into a [`ConfigObject`]. Inline objects pass
//! through untouched; remote URLs are fetched with exactly one GET through a
//! [`ConfigTransport`]. Nothing is retried or cached.

mod http;

pub use http::HttpTransport;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::domain::{ConfigObject, ConfigReference};

/// Transport-level failure while fetching a remote document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be completed
    #[error("request failed: {0}")]
    Request(String),
}

/// Fetches raw documents over the network.
///
/// Implementations issue a single GET without credentials or custom
/// headers and return the response body, whatever the response status.
#[async_trait]
pub trait ConfigTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError>;
}

/// Terminal failures of the load step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// No explicit config, no query parameter and no defaults
    #[error("No configuration found")]
    NoSourceFound,
    /// The `config` query value cannot be used as a URL
    #[error("Invalid config URL {value:?}: {reason}")]
    InvalidUrl { value: String, reason: String },
    /// Transport failure fetching a remote config
    #[error("Failed to fetch config from {url}: {reason}")]
    NetworkFailure { url: String, reason: String },
    /// The remote body is not a JSON object
    #[error("Failed to parse config from {url}: {reason}")]
    ParseFailure { url: String, reason: String },
}

/// Loads configuration objects from references.
#[derive(Clone)]
pub struct ConfigLoader {
    transport: Arc<dyn ConfigTransport>,
}

impl ConfigLoader {
    /// Create a loader backed by the default HTTP transport
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()))
    }

    /// Create a loader backed by a custom transport
    pub fn with_transport(transport: Arc<dyn ConfigTransport>) -> Self {
        Self { transport }
    }

    /// Load the object a reference points to.
    ///
    /// `Inline` resolves without suspending and `Absent` fails without any
    /// network activity.
    pub async fn load(&self, reference: ConfigReference) -> Result<ConfigObject, LoadError> {
        match reference {
            ConfigReference::Inline(config) => Ok(config),
            ConfigReference::RemoteUrl(url) => self.fetch(&url).await,
            ConfigReference::Absent => Err(LoadError::NoSourceFound),
        }
    }

    async fn fetch(&self, url: &Url) -> Result<ConfigObject, LoadError> {
        debug!("Fetching config from {}", url);

        let body = self.transport.get(url).await.map_err(|e| {
            error!("Config request to {} failed: {}", url, e);
            LoadError::NetworkFailure {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let config = decode_config(&body).map_err(|reason| LoadError::ParseFailure {
            url: url.to_string(),
            reason,
        })?;

        debug!("Loaded config with {} top-level field(s)", config.as_map().len());
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a response body into a config object.
pub fn decode_config(body: &[u8]) -> Result<ConfigObject, String> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    ConfigObject::from_value(value).ok_or_else(|| "expected a JSON object".to_string())
}
