//! Error types for the converter

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Conversion errors
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Recursive type reference: {0}")]
    RecursiveType(String),

    #[error("Avro validation error: {0}")]
    Avro(#[from] apache_avro::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
