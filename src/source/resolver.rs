//! Source resolver for picking the configuration channel.
//!
//! Matching priority:
//! 1. Explicit config object -> Inline (query string is not inspected)
//! 2. `config` query parameter -> RemoteUrl
//! 3. Default URL -> RemoteUrl
//! 4. Default object -> Inline
//! 5. Nothing -> Absent

use url::{form_urlencoded, Url};

use crate::domain::{ConfigObject, ConfigReference};

use super::HostEnvironment;

/// Which channel supplied the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit,
    QueryString,
    DefaultUrl,
    DefaultObject,
    Unresolved,
}

/// Result of source resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A usable reference was produced
    Resolved {
        /// The reference to hand to the loader
        reference: ConfigReference,
        /// The channel it came from
        source: ConfigSource,
    },
    /// The query string named a `config` value that is not a usable URL
    InvalidUrl {
        /// The raw value from the query string
        value: String,
        /// Why it could not be used
        reason: String,
    },
}

impl Resolution {
    fn resolved(reference: ConfigReference, source: ConfigSource) -> Self {
        Resolution::Resolved { reference, source }
    }
}

/// Extract the first `config` value from a query string.
///
/// A leading `?` is ignored and percent-escapes are decoded.
pub fn query_config_value(query_string: &str) -> Option<String> {
    let query = query_string.strip_prefix('?').unwrap_or(query_string);
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "config")
        .map(|(_, value)| value.into_owned())
}

/// Turn a query-string value into a URL, resolving relative values against
/// the host's base URL when one is known.
fn parse_config_url(value: &str, base_url: Option<&Url>) -> Result<Url, String> {
    match Url::parse(value) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => match base_url {
            Some(base) => base.join(value).map_err(|e| e.to_string()),
            None => Err("relative URL without a base URL".to_string()),
        },
        Err(e) => Err(e.to_string()),
    }
}

/// Resolve the configuration reference from the four competing sources.
///
/// Pure function of its inputs; `Absent` is not an error by itself.
pub fn resolve(
    explicit: Option<&ConfigObject>,
    query_string: Option<&str>,
    default_url: Option<&Url>,
    default_object: Option<&ConfigObject>,
    base_url: Option<&Url>,
) -> Resolution {
    if let Some(config) = explicit {
        return Resolution::resolved(ConfigReference::Inline(config.clone()), ConfigSource::Explicit);
    }

    if let Some(value) = query_string.and_then(query_config_value) {
        return match parse_config_url(&value, base_url) {
            Ok(url) => Resolution::resolved(ConfigReference::RemoteUrl(url), ConfigSource::QueryString),
            Err(reason) => Resolution::InvalidUrl { value, reason },
        };
    }

    if let Some(url) = default_url {
        return Resolution::resolved(ConfigReference::RemoteUrl(url.clone()), ConfigSource::DefaultUrl);
    }

    if let Some(config) = default_object {
        return Resolution::resolved(
            ConfigReference::Inline(config.clone()),
            ConfigSource::DefaultObject,
        );
    }

    Resolution::resolved(ConfigReference::Absent, ConfigSource::Unresolved)
}

/// Resolve using the host environment for every non-explicit channel.
pub fn resolve_from_host(explicit: Option<&ConfigObject>, host: &HostEnvironment) -> Resolution {
    resolve(
        explicit,
        host.query_string.as_deref(),
        host.default_url.as_ref(),
        host.default_object.as_ref(),
        host.base_url.as_ref(),
    )
}
