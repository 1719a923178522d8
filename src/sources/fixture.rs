//! Post source backed by a local JSON file.
//!
//! ```json
//! {
//!   "announcements": [
//!     { "id": "1", "text": "title: A\ndesc: hello" },
//!     { "id": "2", "text": "desc: https://t.co/x",
//!       "links": [{ "short": "https://t.co/x", "expanded": "https://example.com" }] }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CollectionConfig, Post, Timeline};
use crate::sources::PostSource;

/// Serves timelines from posts held in memory.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    collections: HashMap<String, Vec<Post>>,
}

impl FixtureSource {
    pub fn new(collections: HashMap<String, Vec<Post>>) -> Self {
        Self { collections }
    }

    /// Load posts keyed by collection name from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(serde_json::from_slice(&bytes)?))
    }

    pub fn insert(&mut self, collection: impl Into<String>, posts: Vec<Post>) {
        self.collections.insert(collection.into(), posts);
    }
}

#[async_trait]
impl PostSource for FixtureSource {
    async fn fetch_timeline(
        &self,
        collection: &CollectionConfig,
        max_results: usize,
    ) -> Result<Timeline> {
        let posts = self
            .collections
            .get(&collection.name)
            .map(|posts| posts.iter().take(max_results).cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(Timeline::from_posts(posts))
    }
}
