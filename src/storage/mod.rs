//! Storage abstractions for the published artifact.
//!
//! The content store holds exactly one file. Every read hands back a
//! version token and every write must present the token it read, so a
//! publisher racing another one fails instead of overwriting it.

pub mod github;
pub mod local;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use github::GitHubStore;
pub use local::LocalStorage;

/// Current artifact content and the token identifying that exact state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    pub bytes: Vec<u8>,
    pub version: String,
}

/// Trait for content store backends.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read the artifact. `None` when it has never been published.
    async fn read(&self) -> Result<Option<StoredContent>>;

    /// Replace the artifact if it is still at `version`.
    ///
    /// `version` is `None` only when creating the artifact. A stale token
    /// fails with [`crate::error::AppError::StaleVersion`]. Returns the new
    /// commit identifier.
    async fn write(&self, bytes: &[u8], version: Option<&str>, message: &str) -> Result<String>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}
