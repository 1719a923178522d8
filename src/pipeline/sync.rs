// src/pipeline/sync.rs

//! End-to-end sync: fetch, process, decide, publish.

use futures::future::try_join_all;

use crate::error::Result;
use crate::models::{CollectionReport, Config};
use crate::pipeline::collection::process_collection;
use crate::pipeline::publish::{PublishOutcome, publish};
use crate::services::RecordParser;
use crate::sources::PostSource;
use crate::storage::ContentStore;

/// Options from the invocation trigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Assemble the artifact but never write it
    pub dry_run: bool,
}

/// Result of one sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub collections: Vec<CollectionReport>,
    pub outcome: PublishOutcome,
}

impl SyncReport {
    pub fn record_count(&self) -> usize {
        self.collections.iter().map(|c| c.records.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.collections.iter().map(|c| c.errors.len()).sum()
    }
}

/// Run the full pipeline once.
///
/// All timelines and the current artifact are read concurrently before any
/// processing starts; a failed read aborts the run before publication.
pub async fn run_sync(
    config: &Config,
    posts: &dyn PostSource,
    store: &dyn ContentStore,
    options: SyncOptions,
) -> Result<SyncReport> {
    log::info!(
        "Sync starting: {} collections, dry_run={}",
        config.collections.len(),
        options.dry_run
    );

    let timelines = try_join_all(
        config
            .collections
            .iter()
            .map(|collection| posts.fetch_timeline(collection, config.source.max_results)),
    );
    let (timelines, previous) = tokio::try_join!(timelines, store.read())?;

    let collections: Vec<CollectionReport> = config
        .collections
        .iter()
        .zip(&timelines)
        .map(|(collection, timeline)| {
            let parser = RecordParser::new(collection.kind, &config.parser);
            process_collection(collection, timeline, &parser)
        })
        .collect();

    let outcome = publish(
        store,
        &collections,
        previous.as_ref(),
        options.dry_run,
        &config.store.commit_message,
    )
    .await?;

    Ok(SyncReport {
        collections,
        outcome,
    })
}
