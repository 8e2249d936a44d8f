//! JSON Schema validation for judge requests and results.
//!
//! Both schemas are embedded at compile time from `schemas/` and compiled
//! once into a [`Schemas`] value that callers share by reference.
//!
//! Untyped JSON only becomes a typed value through
//! [`SchemaValidator::parse`], which validates before it deserializes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Embedded request schema (loaded at compile time).
const REQUEST_SCHEMA_JSON: &str = include_str!("../../../schemas/judge_request_v1.schema.json");

/// Embedded result schema (loaded at compile time).
const RESULT_SCHEMA_JSON: &str = include_str!("../../../schemas/judge_result_v1.schema.json");

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid {kind} schema JSON: {message}")]
    InvalidJson { kind: SchemaKind, message: String },

    #[error("Failed to compile {kind} schema: {message}")]
    Compile { kind: SchemaKind, message: String },
}

/// Which document shape a validator checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Request,
    Result,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Request => "request",
            SchemaKind::Result => "result",
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    /// Human-readable `path: message` strings, empty when valid.
    pub errors: Vec<String>,
}

/// A compiled validator for one schema.
pub struct SchemaValidator {
    kind: SchemaKind,
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    fn compile(kind: SchemaKind, source: &str) -> Result<Self, SchemaError> {
        let schema_value: serde_json::Value =
            serde_json::from_str(source).map_err(|e| SchemaError::InvalidJson {
                kind,
                message: e.to_string(),
            })?;

        let validator = jsonschema::options()
            .build(&schema_value)
            .map_err(|e| SchemaError::Compile {
                kind,
                message: e.to_string(),
            })?;

        Ok(Self { kind, validator })
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Validate a JSON value, collecting every error.
    pub fn validate(&self, data: &serde_json::Value) -> Validation {
        let errors: Vec<String> = self
            .validator
            .iter_errors(data)
            .map(|e| {
                let path = e.instance_path.to_string();
                let path = if path.is_empty() { "/".to_string() } else { path };
                format!("{}: {}", path, e)
            })
            .collect();

        Validation {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Check validity without collecting error messages.
    pub fn is_valid(&self, data: &serde_json::Value) -> bool {
        self.validator.is_valid(data)
    }

    /// Validate, then construct the typed value.
    ///
    /// Deserialization never runs on a document that failed validation.
    pub fn parse<T: DeserializeOwned>(&self, data: serde_json::Value) -> Result<T, Vec<String>> {
        let validation = self.validate(&data);
        if !validation.valid {
            return Err(validation.errors);
        }
        serde_json::from_value(data).map_err(|e| vec![format!("/: {}", e)])
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("kind", &self.kind)
            .finish()
    }
}

/// Both compiled validators.
#[derive(Debug)]
pub struct Schemas {
    request: SchemaValidator,
    result: SchemaValidator,
}

impl Schemas {
    /// Compile the embedded request and result schemas.
    pub fn compile() -> Result<Self, SchemaError> {
        let schemas = Self {
            request: SchemaValidator::compile(SchemaKind::Request, REQUEST_SCHEMA_JSON)?,
            result: SchemaValidator::compile(SchemaKind::Result, RESULT_SCHEMA_JSON)?,
        };
        tracing::debug!("compiled request and result schemas");
        Ok(schemas)
    }

    pub fn request(&self) -> &SchemaValidator {
        &self.request
    }

    pub fn result(&self) -> &SchemaValidator {
        &self.result
    }

    pub fn get(&self, kind: SchemaKind) -> &SchemaValidator {
        match kind {
            SchemaKind::Request => &self.request,
            SchemaKind::Result => &self.result,
        }
    }
}
