// src/pipeline/collection.rs

//! Single-collection processing.

use crate::models::{
    CollectionConfig, CollectionReport, ErrorCategory, ErrorDescriptor, Record, Timeline,
};
use crate::pipeline::digest::DigestAccumulator;
use crate::services::{ContinuationResolver, RecordParser};

/// State folded over one collection's posts.
#[derive(Debug, Default)]
struct CollectionState {
    records: Vec<Record>,
    errors: Vec<ErrorDescriptor>,
    digest: DigestAccumulator,
    resolver: ContinuationResolver,
}

/// Process every post of a collection in timeline order.
///
/// A failing post only adds an error; later posts are still processed.
pub fn process_collection(
    collection: &CollectionConfig,
    timeline: &Timeline,
    parser: &RecordParser,
) -> CollectionReport {
    let kind = parser.kind();

    let state = timeline
        .ids
        .iter()
        .fold(CollectionState::default(), |mut state, id| {
            let Some(post) = timeline.posts.get(id) else {
                state.errors.push(ErrorDescriptor::new(
                    ErrorCategory::Unexpected,
                    kind,
                    id.as_str(),
                    "post missing from lookup table",
                ));
                return state;
            };

            state.digest.update(&post.text);

            let outcome = parser.parse(&post.id, &post.expanded_text());
            if let Some(error) = state
                .resolver
                .resolve(&mut state.records, &post.id, kind, outcome)
            {
                state.errors.push(error);
            }
            state
        });

    log::info!(
        "Collection {}: {} posts, {} records, {} errors",
        collection.name,
        state.digest.count(),
        state.records.len(),
        state.errors.len()
    );

    CollectionReport {
        name: collection.name.clone(),
        kind,
        records: state.records,
        errors: state.errors,
        digest: state.digest.finalize(),
    }
}
