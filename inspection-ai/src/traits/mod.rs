//! Provider trait abstractions.

pub mod completion;
pub mod report;
pub mod transcription;
