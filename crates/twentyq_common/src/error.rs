//! Error types for twentyq.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwentyqError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, TwentyqError>;

/// Oracle transport and payload errors. Never leaves the oracle adapter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OracleError {
    #[error("oracle is disabled")]
    Disabled,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP {0} from {1}")]
    Status(u16, String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("oracle returned an empty response")]
    Empty,
}
