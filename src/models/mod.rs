// src/models/mod.rs

//! Domain models for the publishing pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod artifact;
mod config;
mod post;
mod record;
mod report;

// Re-export all public types
pub use artifact::{Baseline, PublishedArtifact};
pub use config::{
    CollectionConfig, Config, LoggingConfig, ParserConfig, SecretsConfig, SourceConfig,
    StoreConfig,
};
pub use post::{Link, Post, Timeline};
pub use record::{
    Announcement, Bulletin, Event, Insert, Occurrence, Record, RecordKind, join_descriptive,
};
pub use report::{ErrorCategory, ErrorDescriptor, SourceLocation};

/// Everything one collection produced in a single pass.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub name: String,
    pub kind: RecordKind,
    pub records: Vec<Record>,
    pub errors: Vec<ErrorDescriptor>,
    /// Fingerprint of the collection's raw post texts
    pub digest: String,
}
