//! Pipeline stages.
//!
//! - `digest`: per-collection change fingerprints
//! - `collection`: fold one collection's posts into records and errors
//! - `publish`: compare digests, assemble and write the artifact
//! - `sync`: run everything once

pub mod collection;
pub mod digest;
pub mod publish;
pub mod sync;

pub use collection::process_collection;
pub use digest::{DigestAccumulator, collection_digest};
pub use publish::{PublishOutcome, assemble, changed_collections, publish, removed_collections};
pub use sync::{SyncOptions, SyncReport, run_sync};
