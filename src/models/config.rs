//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::RecordKind;

/// Artifact fields a collection name must not shadow.
const RESERVED_NAMES: [&str; 4] = ["hashes", "digests", "errors", "updated_at"];

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Post-source API settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Content store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Secret resource names
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Post grammar settings
    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Collections in published order
    #[serde(default = "defaults::collections")]
    pub collections: Vec<CollectionConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if !(1..=100).contains(&self.source.max_results) {
            return Err(AppError::validation(
                "source.max_results must be between 1 and 100",
            ));
        }
        if self.store.path.trim().is_empty() {
            return Err(AppError::validation("store.path is empty"));
        }
        if self.collections.is_empty() {
            return Err(AppError::validation("No collections defined"));
        }

        let mut seen = HashSet::new();
        for collection in &self.collections {
            let name = collection.name.trim();
            if name.is_empty() {
                return Err(AppError::validation("Collection name is empty"));
            }
            if RESERVED_NAMES.contains(&name) {
                return Err(AppError::validation(format!(
                    "Collection name '{name}' is reserved"
                )));
            }
            if !seen.insert(name) {
                return Err(AppError::validation(format!(
                    "Duplicate collection name '{name}'"
                )));
            }
        }
        Ok(())
    }

    /// Collection names in published order.
    pub fn collection_names(&self) -> Vec<&str> {
        self.collections.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            store: StoreConfig::default(),
            secrets: SecretsConfig::default(),
            parser: ParserConfig::default(),
            logging: LoggingConfig::default(),
            collections: defaults::collections(),
        }
    }
}

/// One curated list of posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Name used as the artifact field
    pub name: String,

    /// Identifier of the list at the post source
    #[serde(default)]
    pub list_id: String,

    /// Record kind every post in this list is parsed as
    pub kind: RecordKind,
}

/// Post-source API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "defaults::source_api_base")]
    pub api_base: String,

    /// Maximum posts requested per collection
    #[serde(default = "defaults::max_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::source_api_base(),
            max_results: defaults::max_results(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Content store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "defaults::store_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub repo: String,

    /// Path of the artifact inside the repository
    #[serde(default = "defaults::store_path")]
    pub path: String,

    #[serde(default = "defaults::branch")]
    pub branch: String,

    #[serde(default = "defaults::commit_message")]
    pub commit_message: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::store_api_base(),
            owner: String::new(),
            repo: String::new(),
            path: defaults::store_path(),
            branch: defaults::branch(),
            commit_message: defaults::commit_message(),
        }
    }
}

/// Names of the secrets to fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Secret holding the content store access token
    #[serde(default = "defaults::store_token_secret")]
    pub store_token: String,

    /// Secret holding the four post-source credential fields
    #[serde(default = "defaults::source_credentials_secret")]
    pub source_credentials: String,

    /// Delimiter between the credential fields
    #[serde(default = "defaults::delimiter")]
    pub delimiter: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            store_token: defaults::store_token_secret(),
            source_credentials: defaults::source_credentials_secret(),
            delimiter: defaults::delimiter(),
        }
    }
}

/// Post grammar settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Reject events without any occurrence (legacy grammar)
    #[serde(default)]
    pub require_event_occurrence: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use super::CollectionConfig;
    use crate::models::RecordKind;

    // Source defaults
    pub fn source_api_base() -> String {
        "https://api.twitter.com".into()
    }
    pub fn max_results() -> usize {
        100
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        "postfeed/0.1".into()
    }

    // Store defaults
    pub fn store_api_base() -> String {
        "https://api.github.com".into()
    }
    pub fn store_path() -> String {
        "data/posts.json".into()
    }
    pub fn branch() -> String {
        "main".into()
    }
    pub fn commit_message() -> String {
        "Update posts dataset".into()
    }

    // Secret defaults
    pub fn store_token_secret() -> String {
        "postfeed/store-token".into()
    }
    pub fn source_credentials_secret() -> String {
        "postfeed/source-credentials".into()
    }
    pub fn delimiter() -> String {
        ",".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }

    pub fn collections() -> Vec<CollectionConfig> {
        [
            ("announcements", RecordKind::Announcement),
            ("events", RecordKind::Event),
            ("bulletins", RecordKind::Bulletin),
            ("opportunities", RecordKind::Announcement),
        ]
        .into_iter()
        .map(|(name, kind)| CollectionConfig {
            name: name.to_string(),
            list_id: String::new(),
            kind,
        })
        .collect()
    }
}
