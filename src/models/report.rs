//! Per-post error descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RecordKind;

/// Why a post produced no record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The document could not be decoded
    InvalidSyntax,
    /// Decoded, but required fields are missing or invalid
    InvalidStructure,
    /// Anything else, including an orphaned continuation
    Unexpected,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::InvalidSyntax => "InvalidSyntax",
            ErrorCategory::InvalidStructure => "InvalidStructure",
            ErrorCategory::Unexpected => "Unexpected",
        };
        f.write_str(name)
    }
}

/// Position in the post text reported by the decoder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

/// A post that failed to become a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub category: ErrorCategory,
    pub kind: RecordKind,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub post_id: String,
}

impl ErrorDescriptor {
    /// Create a descriptor and report it to the log.
    pub fn new(
        category: ErrorCategory,
        kind: RecordKind,
        post_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::with_location(category, kind, post_id, reason, None)
    }

    pub fn with_location(
        category: ErrorCategory,
        kind: RecordKind,
        post_id: impl Into<String>,
        reason: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> Self {
        let descriptor = Self {
            category,
            kind,
            reason: reason.into(),
            location,
            post_id: post_id.into(),
        };
        log::warn!("{}", descriptor);
        descriptor
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} in post {}: {}",
            self.kind, self.category, self.post_id, self.reason
        )?;
        if let Some(loc) = self.location {
            write!(f, " (line {}, column {})", loc.line, loc.column)?;
        }
        Ok(())
    }
}
