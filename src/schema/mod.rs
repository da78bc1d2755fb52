//! Schema validation for configuration objects.
//!
//! The schema is generated once from [`ConfigDocument`] and compiled with
//! `jsonschema`. Validation never fails: non-conformance comes back as a
//! [`ValidationResult`] for the caller to log.

use std::collections::BTreeMap;

use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::domain::ConfigObject;

/// Structural contract every configuration object is checked against.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(title = "ViewerConfig")]
pub struct ConfigDocument {
    /// Viewer target descriptor (model identifier or URL)
    pub model: String,
    /// Options descriptor handed to the options UI
    pub config: Map<String, Value>,
    /// Extra viewer parameters
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// The bundled schema document.
pub fn schema_document() -> Value {
    Value::from(schemars::schema_for!(ConfigDocument))
}

/// The bundled schema could not be compiled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to compile config schema: {0}")]
pub struct SchemaCompileError(pub String);

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaError {
    /// JSON pointer to the offending location; for a missing property this
    /// points at the property itself
    pub path: String,
    /// Schema keyword that failed (e.g. `required`, `type`)
    pub keyword: String,
    /// Human-readable description
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{} ({}): {}", path, self.keyword, self.message)
    }
}

/// Outcome of validating one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    Valid,
    Invalid { errors: Vec<SchemaError> },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Violations in validator order; empty when valid.
    pub fn errors(&self) -> &[SchemaError] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid { errors } => errors,
        }
    }
}

/// Compiled schema, shared by every coordinator in the process.
pub struct SchemaValidator {
    validator: Validator,
    document: Value,
}

impl SchemaValidator {
    /// Compile the bundled schema.
    pub fn bundled() -> Result<Self, SchemaCompileError> {
        Self::compile(schema_document())
    }

    /// Compile an arbitrary schema document.
    pub fn compile(document: Value) -> Result<Self, SchemaCompileError> {
        let validator =
            jsonschema::validator_for(&document).map_err(|e| SchemaCompileError(e.to_string()))?;
        debug!("Compiled config schema");
        Ok(Self { validator, document })
    }

    /// The schema document this validator was compiled from.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validate a configuration object.
    pub fn validate(&self, config: &ConfigObject) -> ValidationResult {
        self.validate_value(&config.to_value())
    }

    /// Validate any JSON value, e.g. a file that may not even be an object.
    pub fn validate_value(&self, instance: &Value) -> ValidationResult {
        let errors: Vec<SchemaError> = self
            .validator
            .iter_errors(instance)
            .map(|error| {
                let mut path = error.instance_path.to_string();
                if let ValidationErrorKind::Required { property } = &error.kind {
                    if let Some(name) = property.as_str() {
                        path = format!("{}/{}", path, name);
                    }
                }
                let schema_path = error.schema_path.to_string();
                let keyword = schema_path.rsplit('/').next().unwrap_or_default().to_string();
                SchemaError {
                    path,
                    keyword,
                    message: error.to_string(),
                }
            })
            .collect();

        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { errors }
        }
    }
}
