pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;

use std::path::Path;

use serde_json::Value;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// A loaded OpenAPI document.
///
/// The raw tree backs JSON-pointer resolution; the typed view drives
/// iteration over paths, operations and components. Both are read-only for
/// the lifetime of a conversion.
#[derive(Debug, Clone)]
pub struct Document {
    raw: Value,
    spec: OpenApiSpec,
}

impl Document {
    pub fn from_value(raw: Value) -> Result<Self, ParseError> {
        let spec: OpenApiSpec = serde_json::from_value(raw.clone())?;
        validate_version(&spec)?;
        Ok(Self { raw, spec })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn spec(&self) -> &OpenApiSpec {
        &self.spec
    }
}

/// Parse an OpenAPI document from YAML.
pub fn from_yaml(input: &str) -> Result<Document, ParseError> {
    let raw: Value = serde_yaml_ng::from_str(input)?;
    Document::from_value(raw)
}

/// Parse an OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<Document, ParseError> {
    let raw: Value = serde_json::from_str(input)?;
    Document::from_value(raw)
}

/// Parse a document's contents, choosing the format from the file extension.
/// Anything that is not `.json` is read as YAML.
pub fn from_path_contents(path: &Path, input: &str) -> Result<Document, ParseError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(input),
        _ => from_yaml(input),
    }
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}
