//! Error types for the ElasticNet run pipeline
//!
//! One error enum for the library; the binary wraps it with `anyhow` context.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum Error {
    /// Dataset could not be fetched or read
    #[error("Failed to load dataset from {source_uri}: {reason}")]
    DatasetLoad {
        /// URL or path that was requested
        source_uri: String,
        /// Underlying failure description
        reason: String,
    },

    /// Dataset was fetched but is not a semicolon-delimited numeric table
    #[error("Malformed dataset at line {line}: {reason}")]
    DatasetFormat {
        /// 1-based line number in the source text
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// A required column is absent from the dataset
    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    /// Configuration value could not be parsed
    #[error("Invalid configuration value for {key}: '{value}'")]
    Config {
        /// Configuration key
        key: String,
        /// Raw value that failed to parse
        value: String,
    },

    /// Invalid input (empty matrices, mismatched lengths, bad hyperparameters)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tracking backend rejected a request or returned an unexpected response
    #[error("Tracking error: {0}")]
    Tracking(String),

    /// Model registration requested against a store without a registry
    #[error("Model registry not supported by tracking endpoint {0}")]
    RegistryUnsupported(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}
