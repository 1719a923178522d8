//! Typed records produced from posts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of record a collection carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Announcement,
    Event,
    Bulletin,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Announcement => "Announcement",
            RecordKind::Event => "Event",
            RecordKind::Bulletin => "Bulletin",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully validated record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Announcement(Announcement),
    Event(Event),
    Bulletin(Bulletin),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Announcement(_) => RecordKind::Announcement,
            Record::Event(_) => RecordKind::Event,
            Record::Bulletin(_) => RecordKind::Bulletin,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Record::Announcement(a) => &a.title,
            Record::Event(e) => &e.title,
            Record::Bulletin(b) => &b.title,
        }
    }

    pub fn descriptive(&self) -> &str {
        match self {
            Record::Announcement(a) => &a.descriptive,
            Record::Event(e) => &e.descriptive,
            Record::Bulletin(b) => &b.descriptive,
        }
    }

    fn descriptive_mut(&mut self) -> &mut String {
        match self {
            Record::Announcement(a) => &mut a.descriptive,
            Record::Event(e) => &mut e.descriptive,
            Record::Bulletin(b) => &mut b.descriptive,
        }
    }

    /// Append continuation text to this record's body.
    pub fn append_descriptive(&mut self, text: &str) {
        let body = self.descriptive_mut();
        *body = join_descriptive(body, text);
    }
}

/// Join two bodies with a blank line, or with nothing when either is empty.
pub fn join_descriptive(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (false, false) => format!("{head}\n\n{tail}"),
        (true, _) => tail.to_string(),
        (false, true) => head.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub descriptive: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub descriptive: String,
    /// Scheduled occurrences, in post order
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
}

/// One scheduled slot of an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occurrence {
    pub day: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bulletin {
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub descriptive: String,
    /// Absolute URL of the bulletin document
    pub link: String,
    #[serde(default)]
    pub inserts: Vec<Insert>,
}

/// A linked sub-entry of a bulletin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insert {
    pub title: String,
    pub link: String,
}
