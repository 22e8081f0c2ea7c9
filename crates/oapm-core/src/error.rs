use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("reference not found: {reference} (no segment '{segment}')")]
    RefNotFound { reference: String, segment: String },

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("reference target {reference} has an unexpected shape: {message}")]
    Deserialize { reference: String, message: String },
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("failed to render description: {0}")]
    Render(String),

    #[error("failed to serialize example: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("conversion failed: {0}")]
    Other(String),
}
