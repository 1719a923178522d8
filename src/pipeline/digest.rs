//! Collection fingerprints for change detection.
//!
//! Every raw post text is framed by its length before hashing, so moving
//! text between adjacent posts changes the digest as well.

use sha2::{Digest, Sha256};

/// Incremental SHA-256 over a collection's raw post texts.
#[derive(Debug, Clone, Default)]
pub struct DigestAccumulator {
    hasher: Sha256,
    count: usize,
}

impl DigestAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one post's raw, unexpanded text.
    pub fn update(&mut self, raw_text: &str) {
        self.hasher.update((raw_text.len() as u64).to_be_bytes());
        self.hasher.update(raw_text.as_bytes());
        self.count += 1;
    }

    /// Number of posts fed so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Hex-encoded digest.
    pub fn finalize(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// Digest of a sequence of raw texts.
pub fn collection_digest<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    let mut acc = DigestAccumulator::new();
    for text in texts {
        acc.update(text);
    }
    acc.finalize()
}
