//! Host environment: the non-explicit configuration channels.
//!
//! A hosting page exposes a query string, an optional default URL and an
//! optional default object. They are collected here as plain values so the
//! resolver stays a pure function of its inputs.

use tracing::{debug, warn};
use url::Url;

use crate::domain::ConfigObject;

/// Query string of the hosting page
pub const ENV_QUERY: &str = "VIEWER_CONFIG_QUERY";
/// Default config URL
pub const ENV_DEFAULT_CONFIG_URL: &str = "VIEWER_DEFAULT_CONFIG_URL";
/// Default config object (inline JSON)
pub const ENV_DEFAULT_CONFIG: &str = "VIEWER_DEFAULT_CONFIG";
/// Base URL for relative `config` query values
pub const ENV_BASE_URL: &str = "VIEWER_BASE_URL";
/// Whether the viewer runs embedded in another page
pub const ENV_EMBEDDED: &str = "VIEWER_EMBEDDED";

/// Everything the host supplies besides the explicit config.
#[derive(Debug, Clone, Default)]
pub struct HostEnvironment {
    /// Raw query string of the hosting page (with or without the leading `?`)
    pub query_string: Option<String>,
    /// Default config URL
    pub default_url: Option<Url>,
    /// Default config object
    pub default_object: Option<ConfigObject>,
    /// Base URL used to resolve a relative `config` query value
    pub base_url: Option<Url>,
    /// Whether the viewer is embedded in a foreign page
    pub embedded: bool,
}

impl HostEnvironment {
    /// Build a host environment from process environment variables.
    ///
    /// Values that cannot be parsed are logged and ignored.
    pub fn from_env() -> Self {
        let query_string = non_empty_var(ENV_QUERY);
        let default_url =
            non_empty_var(ENV_DEFAULT_CONFIG_URL).and_then(|raw| parse_url(ENV_DEFAULT_CONFIG_URL, &raw));
        let base_url = non_empty_var(ENV_BASE_URL).and_then(|raw| parse_url(ENV_BASE_URL, &raw));
        let default_object = non_empty_var(ENV_DEFAULT_CONFIG).and_then(|raw| parse_object(&raw));
        let embedded = non_empty_var(ENV_EMBEDDED)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        debug!(
            "Host environment: query={:?} default_url={:?} default_object={} embedded={}",
            query_string,
            default_url.as_ref().map(Url::as_str),
            default_object.is_some(),
            embedded
        );

        Self {
            query_string,
            default_url,
            default_object,
            base_url,
            embedded,
        }
    }

    /// Set the query string
    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = Some(query_string.into());
        self
    }

    /// Set the default config URL
    pub fn with_default_url(mut self, url: Url) -> Self {
        self.default_url = Some(url);
        self
    }

    /// Set the default config object
    pub fn with_default_object(mut self, config: ConfigObject) -> Self {
        self.default_object = Some(config);
        self
    }

    /// Set the base URL for relative query values
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Mark the host as embedded
    pub fn embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_url(name: &str, raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Ignoring {}: invalid URL {:?}: {}", name, raw, e);
            None
        }
    }
}

fn parse_object(raw: &str) -> Option<ConfigObject> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => {
            let config = ConfigObject::from_value(value);
            if config.is_none() {
                warn!("Ignoring {}: not a JSON object", ENV_DEFAULT_CONFIG);
            }
            config
        }
        Err(e) => {
            warn!("Ignoring {}: {}", ENV_DEFAULT_CONFIG, e);
            None
        }
    }
}
