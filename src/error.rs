// src/error.rs

//! Unified error handling for the publishing pipeline.
//!
//! Only collaborator-level failures live here. A post that fails to parse
//! is reported through [`crate::models::ErrorDescriptor`] instead and never
//! becomes an `AppError`.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Base64 payload could not be decoded
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Secret retrieval failed
    #[error("Secret error for {name}: {message}")]
    Secret { name: String, message: String },

    /// Post-source API failure
    #[error("Post source error for {collection}: {message}")]
    PostSource { collection: String, message: String },

    /// Content store read/write failure
    #[error("Content store error: {0}")]
    Store(String),

    /// The store rejected a write because the version token is outdated
    #[error("Stale version token: {0}")]
    StaleVersion(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a secret retrieval error.
    pub fn secret(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Secret {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create a post-source error for a collection.
    pub fn post_source(collection: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::PostSource {
            collection: collection.into(),
            message: message.to_string(),
        }
    }

    /// Create a content store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }

    /// Whether this failure came from the post-source API.
    pub fn is_post_source(&self) -> bool {
        matches!(self, Self::PostSource { .. })
    }
}
