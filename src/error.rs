use thiserror::Error;

/// Core error types for the collection generator
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration validation errors, rejected before any synthesis runs
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Collection name must not be empty")]
    EmptyCollectionName,

    #[error("Generator '{name}': min ({min}) must be less than max ({max})")]
    InvalidRange { name: String, min: i64, max: i64 },

    #[error("Generator '{name}': string length must be positive, got {length}")]
    InvalidLength { name: String, length: i64 },

    #[error("Duplicate generator name: {0}")]
    DuplicateGeneratorName(String),

    #[error("Query '{0}' has no endpoint path")]
    MissingEndpoint(String),

    #[error("Invalid authentication config: {0}")]
    InvalidAuth(String),
}

/// Artifact cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Collection not found or expired: {0}")]
    NotFound(String),

    #[error("Unknown file type: {0}")]
    UnknownFileType(String),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
