//! Error types for the JSON-LD validator

use thiserror::Error;

/// Result type for validator operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Top-level validator errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("No shape registered for type: {0}")]
    UnknownType(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not retrieve data: {0}")]
    Fetch(#[from] FetchError),
}

/// Why a page could not be retrieved
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("connection to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A single `application/ld+json` script that could not be decoded
#[derive(Error, Debug)]
#[error("script #{index} is not valid JSON: {source}")]
pub struct DecodeError {
    pub index: usize,
    #[source]
    pub source: serde_json::Error,
}
