// src/services/parser.rs

//! Post text parser.
//!
//! Posts are written in a small YAML dialect:
//!
//! ```text
//! title: Open Lab Night
//! color: teal
//! desc: Bring a project.
//! times:
//!   - day: Friday
//!     time: 18:00
//!     location: Room 101
//! ```
//!
//! Decoding happens in two passes. The first decodes an untyped value and
//! only checks syntax and the failsafe subset (mapping root, no tags). The
//! second decodes a draft whose scalars are all strings, so `title: 2024`
//! stays the text `2024`. Required fields are checked on the draft.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Deserialize;
use serde_yaml::Value;
use url::Url;

use crate::models::{
    Announcement, Bulletin, ErrorCategory, ErrorDescriptor, Event, Insert, Occurrence,
    ParserConfig, Record, RecordKind, SourceLocation,
};

/// What a single post turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A complete record starting a new entry
    Primary(Record),
    /// Untitled text to append to the previous primary record
    Continuation(String),
    Failed(ErrorDescriptor),
}

#[derive(Debug, Default, Deserialize)]
struct Draft {
    title: Option<String>,
    subtitle: Option<String>,
    color: Option<String>,
    #[serde(alias = "description", alias = "descriptive")]
    desc: Option<String>,
    date: Option<String>,
    link: Option<String>,
    inserts: Option<Vec<DraftInsert>>,
    #[serde(alias = "occurrences")]
    times: Option<Vec<DraftOccurrence>>,
}

#[derive(Debug, Default, Deserialize)]
struct DraftOccurrence {
    day: Option<String>,
    time: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DraftInsert {
    title: Option<String>,
    link: Option<String>,
}

/// Parses post text into records of one kind.
#[derive(Debug, Clone)]
pub struct RecordParser {
    kind: RecordKind,
    require_event_occurrence: bool,
}

impl RecordParser {
    pub fn new(kind: RecordKind, config: &ParserConfig) -> Self {
        Self {
            kind,
            require_event_occurrence: config.require_event_occurrence,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Parse one post. Never panics.
    pub fn parse(&self, post_id: &str, text: &str) -> ParseOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| self.parse_document(post_id, text)))
            .unwrap_or_else(|payload| {
                self.fail(ErrorCategory::Unexpected, post_id, panic_reason(payload.as_ref()))
            })
    }

    fn parse_document(&self, post_id: &str, text: &str) -> ParseOutcome {
        if text.trim().is_empty() {
            return self.fail(ErrorCategory::InvalidStructure, post_id, "empty post");
        }

        let value: Value = match serde_yaml::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                let location = e.location().map(|loc| SourceLocation {
                    line: loc.line(),
                    column: loc.column(),
                });
                return ParseOutcome::Failed(ErrorDescriptor::with_location(
                    ErrorCategory::InvalidSyntax,
                    self.kind,
                    post_id,
                    e.to_string(),
                    location,
                ));
            }
        };

        if !value.is_mapping() {
            return self.fail(
                ErrorCategory::InvalidStructure,
                post_id,
                "document is not a mapping",
            );
        }
        if contains_tag(&value) {
            return self.fail(
                ErrorCategory::InvalidStructure,
                post_id,
                "tagged values are not allowed",
            );
        }

        let draft: Draft = match serde_yaml::from_str(text) {
            Ok(draft) => draft,
            Err(e) => return self.fail(ErrorCategory::InvalidStructure, post_id, e.to_string()),
        };

        let title = clean(draft.title.clone());
        let descriptive = clean(draft.desc.clone()).unwrap_or_default();

        if title.is_none() {
            if descriptive.is_empty() {
                return self.fail(ErrorCategory::InvalidStructure, post_id, "missing title");
            }
            return ParseOutcome::Continuation(descriptive);
        }

        match self.build(draft) {
            Ok(record) => ParseOutcome::Primary(record),
            Err(reason) => self.fail(ErrorCategory::InvalidStructure, post_id, reason),
        }
    }

    fn build(&self, draft: Draft) -> Result<Record, String> {
        let title = clean(draft.title).ok_or("missing title")?;
        let subtitle = clean(draft.subtitle);
        let color = clean(draft.color);
        let descriptive = clean(draft.desc).unwrap_or_default();

        let record = match self.kind {
            RecordKind::Announcement => Record::Announcement(Announcement {
                title,
                subtitle,
                color,
                descriptive,
            }),
            RecordKind::Event => {
                let occurrences = draft
                    .times
                    .unwrap_or_default()
                    .into_iter()
                    .enumerate()
                    .map(|(i, slot)| -> Result<Occurrence, String> {
                        Ok(Occurrence {
                            day: clean(slot.day)
                                .ok_or_else(|| format!("occurrence {} is missing day", i + 1))?,
                            time: clean(slot.time)
                                .ok_or_else(|| format!("occurrence {} is missing time", i + 1))?,
                            location: clean(slot.location),
                        })
                    })
                    .collect::<Result<Vec<_>, String>>()?;

                if self.require_event_occurrence && occurrences.is_empty() {
                    return Err("event has no occurrences".to_string());
                }

                Record::Event(Event {
                    title,
                    subtitle,
                    color,
                    descriptive,
                    occurrences,
                })
            }
            RecordKind::Bulletin => {
                let date = clean(draft.date).ok_or("missing date")?;
                let link = validate_link("link", clean(draft.link).ok_or("missing link")?)?;
                let inserts = draft
                    .inserts
                    .unwrap_or_default()
                    .into_iter()
                    .enumerate()
                    .map(|(i, insert)| -> Result<Insert, String> {
                        let field = format!("insert {} link", i + 1);
                        let title = clean(insert.title)
                            .ok_or_else(|| format!("insert {} is missing title", i + 1))?;
                        let link = clean(insert.link)
                            .ok_or_else(|| format!("insert {} is missing link", i + 1))?;
                        Ok(Insert {
                            title,
                            link: validate_link(&field, link)?,
                        })
                    })
                    .collect::<Result<Vec<_>, String>>()?;

                Record::Bulletin(Bulletin {
                    title,
                    date,
                    subtitle,
                    color,
                    descriptive,
                    link,
                    inserts,
                })
            }
        };
        Ok(record)
    }

    fn fail(
        &self,
        category: ErrorCategory,
        post_id: &str,
        reason: impl Into<String>,
    ) -> ParseOutcome {
        ParseOutcome::Failed(ErrorDescriptor::new(category, self.kind, post_id, reason))
    }
}

/// Message carried by a caught panic.
fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "parser panicked".to_string())
}

/// Trim a scalar; blank counts as absent.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn validate_link(field: &str, link: String) -> Result<String, String> {
    match Url::parse(&link) {
        Ok(_) => Ok(link),
        Err(e) => Err(format!("{field} is not a valid URL ({e}): {link}")),
    }
}

fn contains_tag(value: &Value) -> bool {
    match value {
        Value::Tagged(_) => true,
        Value::Sequence(items) => items.iter().any(contains_tag),
        Value::Mapping(map) => map
            .iter()
            .any(|(key, value)| contains_tag(key) || contains_tag(value)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(kind: RecordKind) -> RecordParser {
        RecordParser::new(kind, &ParserConfig::default())
    }

    fn failed(outcome: ParseOutcome) -> ErrorDescriptor {
        match outcome {
            ParseOutcome::Failed(e) => e,
            other => panic!("expected failure, got {other:?}"),
        }
    }

    fn primary(outcome: ParseOutcome) -> Record {
        match outcome {
            ParseOutcome::Primary(r) => r,
            other => panic!("expected primary record, got {other:?}"),
        }
    }

    #[test]
    fn test_announcement_primary() {
        let record = primary(
            parser(RecordKind::Announcement)
                .parse("1", "title: A\nsubtitle: B\ncolor: red\ndesc: hello\nextra: ignored"),
        );
        assert_eq!(
            record,
            Record::Announcement(Announcement {
                title: "A".into(),
                subtitle: Some("B".into()),
                color: Some("red".into()),
                descriptive: "hello".into(),
            })
        );
    }

    #[test]
    fn test_scalars_keep_literal_text() {
        let record = primary(parser(RecordKind::Announcement).parse("1", "title: 2024\ndesc: true"));
        assert_eq!(record.title(), "2024");
        assert_eq!(record.descriptive(), "true");
    }

    #[test]
    fn test_block_scalar_is_trimmed() {
        let record = primary(
            parser(RecordKind::Announcement).parse("1", "title: A\ndesc: |\n  line one\n  line two\n"),
        );
        assert_eq!(record.descriptive(), "line one\nline two");
    }

    #[test]
    fn test_untitled_text_is_continuation() {
        let outcome = parser(RecordKind::Event).parse("2", "desc: world");
        assert_eq!(outcome, ParseOutcome::Continuation("world".into()));
    }

    #[test]
    fn test_untitled_without_text_is_structure_error() {
        let error = failed(parser(RecordKind::Announcement).parse("3", "color: blue"));
        assert_eq!(error.category, ErrorCategory::InvalidStructure);
        assert_eq!(error.post_id, "3");
        assert_eq!(error.kind, RecordKind::Announcement);
    }

    #[test]
    fn test_malformed_yaml_is_syntax_error_with_location() {
        let error = failed(parser(RecordKind::Announcement).parse("4", "title: [unclosed\ndesc: x"));
        assert_eq!(error.category, ErrorCategory::InvalidSyntax);
        assert!(error.location.is_some());
    }

    #[test]
    fn test_non_mapping_root_is_structure_error() {
        for text in ["just some words", "- a\n- b", ""] {
            let error = failed(parser(RecordKind::Announcement).parse("5", text));
            assert_eq!(error.category, ErrorCategory::InvalidStructure, "{text:?}");
        }
    }

    #[test]
    fn test_tags_are_rejected() {
        let error = failed(parser(RecordKind::Announcement).parse("6", "title: !Thing A"));
        assert_eq!(error.category, ErrorCategory::InvalidStructure);
    }

    #[test]
    fn test_wrong_field_type_is_structure_error() {
        let error = failed(parser(RecordKind::Announcement).parse("7", "title: [a, b]"));
        assert_eq!(error.category, ErrorCategory::InvalidStructure);
    }

    #[test]
    fn test_event_occurrences() {
        let text = "title: Lab\ntimes:\n  - day: Friday\n    time: '18:00'\n    location: Room 1\n  - day: Saturday\n    time: noon";
        match primary(parser(RecordKind::Event).parse("8", text)) {
            Record::Event(event) => {
                assert_eq!(event.occurrences.len(), 2);
                assert_eq!(event.occurrences[0].location.as_deref(), Some("Room 1"));
                assert_eq!(event.occurrences[1].location, None);
                assert_eq!(event.occurrences[1].time, "noon");
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn test_event_occurrence_missing_time_invalidates_record() {
        let text = "title: Lab\ntimes:\n  - day: Friday\n    time: noon\n  - day: Saturday";
        let error = failed(parser(RecordKind::Event).parse("9", text));
        assert_eq!(error.category, ErrorCategory::InvalidStructure);
        assert!(error.reason.contains("occurrence 2"));
    }

    #[test]
    fn test_event_occurrence_requirement_is_configurable() {
        assert!(matches!(
            parser(RecordKind::Event).parse("10", "title: Lab"),
            ParseOutcome::Primary(_)
        ));

        let strict = RecordParser::new(
            RecordKind::Event,
            &ParserConfig {
                require_event_occurrence: true,
            },
        );
        let error = failed(strict.parse("10", "title: Lab"));
        assert_eq!(error.category, ErrorCategory::InvalidStructure);
    }

    #[test]
    fn test_bulletin_primary() {
        let text = "title: Weekly\ndate: 2026-10-12\nlink: https://example.com/weekly.pdf\ninserts:\n  - title: Menu\n    link: https://example.com/menu.pdf";
        match primary(parser(RecordKind::Bulletin).parse("11", text)) {
            Record::Bulletin(bulletin) => {
                assert_eq!(bulletin.date, "2026-10-12");
                assert_eq!(bulletin.link, "https://example.com/weekly.pdf");
                assert_eq!(
                    bulletin.inserts,
                    vec![Insert {
                        title: "Menu".into(),
                        link: "https://example.com/menu.pdf".into(),
                    }]
                );
            }
            other => panic!("expected bulletin, got {other:?}"),
        }
    }

    #[test]
    fn test_bulletin_invalid_link_is_structure_error() {
        let error = failed(
            parser(RecordKind::Bulletin).parse("12", "title: Weekly\ndate: today\nlink: not-a-url"),
        );
        assert_eq!(error.category, ErrorCategory::InvalidStructure);
        assert!(error.reason.contains("not-a-url"));
    }

    #[test]
    fn test_bulletin_invalid_insert_link_is_structure_error() {
        let text = "title: Weekly\ndate: today\nlink: https://example.com/a\ninserts:\n  - title: Menu\n    link: menu.pdf";
        let error = failed(parser(RecordKind::Bulletin).parse("13", text));
        assert_eq!(error.category, ErrorCategory::InvalidStructure);
        assert!(error.reason.contains("insert 1 link"));
    }

    #[test]
    fn test_bulletin_requires_date() {
        let error = failed(
            parser(RecordKind::Bulletin).parse("14", "title: Weekly\nlink: https://example.com/a"),
        );
        assert_eq!(error.category, ErrorCategory::InvalidStructure);
        assert_eq!(error.reason, "missing date");
    }

    #[test]
    fn test_panic_reason_from_payload() {
        let hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let literal = panic::catch_unwind(|| -> u8 { panic!("boom") }).unwrap_err();
        let formatted = panic::catch_unwind(|| -> u8 { panic!("bad {}", 7) }).unwrap_err();
        let other = panic::catch_unwind(|| -> u8 { panic::panic_any(42_u8) }).unwrap_err();
        panic::set_hook(hook);

        assert_eq!(panic_reason(literal.as_ref()), "boom");
        assert_eq!(panic_reason(formatted.as_ref()), "bad 7");
        assert_eq!(panic_reason(other.as_ref()), "parser panicked");
    }

    #[test]
    fn test_untitled_bulletin_is_continuation() {
        let outcome = parser(RecordKind::Bulletin).parse("15", "date: today\ndesc: more");
        assert_eq!(outcome, ParseOutcome::Continuation("more".into()));
    }
}
