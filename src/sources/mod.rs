//! External read collaborators: post timelines and secrets.

pub mod fixture;
pub mod secrets;
pub mod twitter;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CollectionConfig, Timeline};

pub use fixture::FixtureSource;
#[cfg(feature = "lambda")]
pub use secrets::AwsSecrets;
pub use secrets::{EnvSecrets, SecretSource, SourceCredentials, StoreToken};
pub use twitter::TwitterSource;

/// Trait for post-source backends.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch up to `max_results` posts of a collection, newest first as the
    /// source orders them.
    async fn fetch_timeline(
        &self,
        collection: &CollectionConfig,
        max_results: usize,
    ) -> Result<Timeline>;
}
