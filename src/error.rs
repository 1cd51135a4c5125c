//! Unified error types for Rigging

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Rigging operations
#[derive(Error, Debug)]
pub enum Error {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Config errors
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation failed: {0}")]
    ConfigValidation(String),

    // Network errors
    #[error("Invalid subnet '{input}': {reason}")]
    InvalidSubnet { input: String, reason: String },

    #[error("Failed to write address listing to '{path}': {source}")]
    ListingWrite { path: PathBuf, source: io::Error },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    // RPC errors
    #[error("Server not responding at {url}: {message}")]
    Connectivity { url: String, message: String },

    #[error("RPC method '{method}' failed: {message}")]
    Rpc { method: String, message: String },

    #[error("Malformed '{method}' response: missing {field}")]
    MalformedResponse { method: String, field: String },

    #[error("Timed out after {0} seconds waiting for {1}")]
    Timeout(u64, String),

    // Transaction errors
    #[error("Submit failed: {0}")]
    SubmitFailed(String),
}

/// Result type alias for Rigging operations
pub type Result<T> = std::result::Result<T, Error>;
