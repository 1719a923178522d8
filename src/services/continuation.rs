// src/services/continuation.rs

//! Continuation stitching.
//!
//! A post without a title extends the most recent primary record of the
//! same collection instead of starting a new one.

use crate::models::{ErrorCategory, ErrorDescriptor, Record, RecordKind};
use crate::services::parser::ParseOutcome;

/// Tracks the last primary record of one collection pass.
#[derive(Debug, Default)]
pub struct ContinuationResolver {
    /// Index into the collection's record list
    last_primary: Option<usize>,
}

impl ContinuationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one parse outcome to the collection's records.
    ///
    /// Returns the error to report for this post, if any.
    pub fn resolve(
        &mut self,
        records: &mut Vec<Record>,
        post_id: &str,
        kind: RecordKind,
        outcome: ParseOutcome,
    ) -> Option<ErrorDescriptor> {
        match outcome {
            ParseOutcome::Primary(record) => {
                records.push(record);
                self.last_primary = Some(records.len() - 1);
                None
            }
            ParseOutcome::Continuation(text) => {
                match self.last_primary.and_then(|i| records.get_mut(i)) {
                    Some(primary) => {
                        log::debug!("Post {} continues \"{}\"", post_id, primary.title());
                        primary.append_descriptive(&text);
                        None
                    }
                    None => Some(ErrorDescriptor::new(
                        ErrorCategory::Unexpected,
                        kind,
                        post_id,
                        "Continuation tweet with no primary",
                    )),
                }
            }
            ParseOutcome::Failed(error) => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Announcement;

    fn primary(title: &str, descriptive: &str) -> ParseOutcome {
        ParseOutcome::Primary(Record::Announcement(Announcement {
            title: title.into(),
            subtitle: None,
            color: None,
            descriptive: descriptive.into(),
        }))
    }

    fn continuation(text: &str) -> ParseOutcome {
        ParseOutcome::Continuation(text.into())
    }

    #[test]
    fn test_continuation_appends_to_last_primary() {
        let mut resolver = ContinuationResolver::new();
        let mut records = Vec::new();
        let kind = RecordKind::Announcement;

        assert!(resolver.resolve(&mut records, "1", kind, primary("A", "a")).is_none());
        assert!(resolver.resolve(&mut records, "2", kind, primary("B", "")).is_none());
        assert!(resolver.resolve(&mut records, "3", kind, continuation("b1")).is_none());
        assert!(resolver.resolve(&mut records, "4", kind, continuation("b2")).is_none());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].descriptive(), "a");
        assert_eq!(records[1].descriptive(), "b1\n\nb2");
    }

    #[test]
    fn test_orphan_continuation_is_error() {
        let mut resolver = ContinuationResolver::new();
        let mut records = Vec::new();

        let error = resolver
            .resolve(&mut records, "1", RecordKind::Event, continuation("lost"))
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(error.category, ErrorCategory::Unexpected);
        assert_eq!(error.reason, "Continuation tweet with no primary");
        assert_eq!(error.kind, RecordKind::Event);
    }

    #[test]
    fn test_failed_post_keeps_last_primary() {
        let mut resolver = ContinuationResolver::new();
        let mut records = Vec::new();
        let kind = RecordKind::Announcement;
        let failure = ParseOutcome::Failed(ErrorDescriptor::new(
            ErrorCategory::InvalidSyntax,
            kind,
            "2",
            "bad",
        ));

        resolver.resolve(&mut records, "1", kind, primary("A", "a"));
        let error = resolver.resolve(&mut records, "2", kind, failure).unwrap();
        resolver.resolve(&mut records, "3", kind, continuation("more"));

        assert_eq!(error.post_id, "2");
        assert_eq!(records[0].descriptive(), "a\n\nmore");
    }
}
