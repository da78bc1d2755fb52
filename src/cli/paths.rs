use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use viewer_configurator::domain::ConfigObject;

/// Read and decode a JSON file.
pub fn read_json_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Read a JSON file that must hold a config object.
pub fn read_config_file(path: &Path) -> Result<ConfigObject> {
    let value = read_json_file(path)?;
    ConfigObject::from_value(value)
        .with_context(|| format!("Config file is not a JSON object: {}", path.display()))
}
