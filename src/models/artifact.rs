//! The published dataset and its read-back baseline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ErrorDescriptor, Record};

/// The artifact written to the content store.
///
/// Serializes as one top-level array per collection name next to the
/// `hashes`, `digests`, `errors` and `updated_at` fields.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedArtifact {
    #[serde(flatten)]
    pub datasets: BTreeMap<String, Vec<Record>>,

    /// Digests in configured collection order
    pub hashes: Vec<String>,

    /// Digests keyed by collection name
    pub digests: BTreeMap<String, String>,

    pub errors: BTreeMap<String, Vec<ErrorDescriptor>>,

    pub updated_at: DateTime<Utc>,
}

impl PublishedArtifact {
    pub fn record_count(&self) -> usize {
        self.datasets.values().map(Vec::len).sum()
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Digests recorded by the previously published artifact.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Baseline {
    #[serde(default)]
    pub hashes: Vec<String>,

    #[serde(default)]
    pub digests: BTreeMap<String, String>,
}

impl Baseline {
    /// Read the baseline out of a stored artifact.
    ///
    /// Unreadable content yields an empty baseline, which marks every
    /// collection as changed.
    pub fn from_artifact_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_else(|e| {
            log::warn!("Previous artifact is unreadable ({}); treating as empty", e);
            Self::default()
        })
    }

    /// The previous digest of a collection.
    ///
    /// Named digests win; older artifacts only carry the positional array.
    pub fn digest_for(&self, name: &str, position: usize) -> Option<&str> {
        if self.digests.is_empty() {
            self.hashes.get(position).map(String::as_str)
        } else {
            self.digests.get(name).map(String::as_str)
        }
    }
}
