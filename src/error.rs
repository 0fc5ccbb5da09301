// src/error.rs
// Standardized error types for cellmate

use thiserror::Error;

/// Main error type for the cellmate library
#[derive(Error, Debug)]
pub enum CellmateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relay returned {status}: {body}")]
    RelayStatus { status: u16, body: String },

    #[error("daemon returned {status}: {body}")]
    DaemonStatus { status: u16, body: String },

    #[error("empty completion from daemon")]
    EmptyCompletion,

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using CellmateError
pub type Result<T> = std::result::Result<T, CellmateError>;
