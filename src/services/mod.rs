//! Service layer for the publishing pipeline.
//!
//! This module contains the per-post logic:
//! - Post text parsing (`RecordParser`)
//! - Continuation stitching (`ContinuationResolver`)

mod continuation;
mod parser;

pub use continuation::ContinuationResolver;
pub use parser::{ParseOutcome, RecordParser};
