//! Domain types shared across modules.
//!
//! The resolver produces a [`ConfigReference`], the loader turns it into a
//! [`ConfigObject`], and the coordinator routes the object's sub-fields to
//! the collaborators. Keeping these types here avoids circular dependencies
//! between those modules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use url::Url;

/// Viewer parameters, always a string-to-string mapping.
pub type Params = BTreeMap<String, String>;

/// A resolved configuration object.
///
/// The object is untyped beyond schema validation: the core only looks at
/// the `model`, `config` and `params` fields in order to route them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigObject(Map<String, Value>);

impl ConfigObject {
    /// Wrap an already decoded JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a config object from any JSON value.
    ///
    /// Returns `None` when the value is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The viewer target descriptor, or `null` when the field is missing.
    pub fn model(&self) -> &Value {
        self.0.get("model").unwrap_or(&Value::Null)
    }

    /// The options descriptor, or `null` when the field is missing.
    pub fn options(&self) -> &Value {
        self.0.get("config").unwrap_or(&Value::Null)
    }

    /// The viewer parameters; an absent field yields an empty mapping.
    ///
    /// Non-string values are carried over in their JSON text form. A `params`
    /// field that is not an object is ignored.
    pub fn params(&self) -> Params {
        match self.0.get("params") {
            None | Some(Value::Null) => Params::new(),
            Some(Value::Object(entries)) => entries
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), value)
                })
                .collect(),
            Some(other) => {
                warn!("Ignoring non-object params: {}", other);
                Params::new()
            }
        }
    }

    /// Borrow the object as a JSON map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON value, e.g. to feed the schema validator.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for ConfigObject {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Where a configuration is to be found, as decided by the source resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigReference {
    /// A concrete object that needs no loading
    Inline(ConfigObject),
    /// A document that has to be fetched
    RemoteUrl(Url),
    /// No source supplied a configuration
    Absent,
}

impl ConfigReference {
    /// Short label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigReference::Inline(_) => "inline",
            ConfigReference::RemoteUrl(_) => "remote",
            ConfigReference::Absent => "absent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> ConfigObject {
        ConfigObject::from_value(value).unwrap()
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(ConfigObject::from_value(json!([1, 2])).is_none());
        assert!(ConfigObject::from_value(json!("model")).is_none());
        assert!(ConfigObject::from_value(json!({})).is_some());
    }

    #[test]
    fn test_missing_fields_route_as_null_and_empty() {
        let config = object(json!({}));
        assert_eq!(config.model(), &Value::Null);
        assert_eq!(config.options(), &Value::Null);
        assert!(config.params().is_empty());
    }

    #[test]
    fn test_params_stringify_non_string_values() {
        let config = object(json!({"params": {"lang": "en", "zoom": 2, "debug": true}}));
        let params = config.params();
        assert_eq!(params.get("lang").map(String::as_str), Some("en"));
        assert_eq!(params.get("zoom").map(String::as_str), Some("2"));
        assert_eq!(params.get("debug").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_non_object_params_are_ignored() {
        let config = object(json!({"params": ["a", "b"]}));
        assert!(config.params().is_empty());
    }

    #[test]
    fn test_serde_is_transparent() {
        let config = object(json!({"model": "m1"}));
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({"model": "m1"}));
    }
}
