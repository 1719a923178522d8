//! Local filesystem storage implementation.
//!
//! Keeps the artifact in a single file for development and offline runs.
//! The version token is the SHA-256 of the file's current bytes, which
//! gives the same compare-and-swap behaviour as the remote store.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── posts.json            # Published artifact
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{ContentStore, StoredContent};

const ARTIFACT_FILE: &str = "posts.json";

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self) -> PathBuf {
        self.root_dir.join(ARTIFACT_FILE)
    }

    fn version_of(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path()).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        let path = self.path();
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for LocalStorage {
    async fn read(&self) -> Result<Option<StoredContent>> {
        Ok(self.read_bytes().await?.map(|bytes| StoredContent {
            version: Self::version_of(&bytes),
            bytes,
        }))
    }

    async fn write(&self, bytes: &[u8], version: Option<&str>, message: &str) -> Result<String> {
        let current = self.read_bytes().await?.map(|b| Self::version_of(&b));
        if current.as_deref() != version {
            return Err(AppError::StaleVersion(format!(
                "{} is at {}, write expected {}",
                self.location(),
                current.as_deref().unwrap_or("<absent>"),
                version.unwrap_or("<absent>")
            )));
        }

        self.write_bytes(bytes).await?;
        let commit = Self::version_of(bytes);
        log::info!("Wrote {} ({}): {}", self.location(), &commit[..12], message);
        Ok(commit)
    }

    fn location(&self) -> String {
        self.path().display().to_string()
    }
}
