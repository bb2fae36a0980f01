//! Shared types exchanged with providers.

pub mod report;
pub mod transcription;
