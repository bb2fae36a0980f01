//! Inspection AI abstraction layer for transcription, completion, and
//! report-rendering providers.
//!
//! This crate provides trait-based abstractions for the call-analysis
//! workflow:
//! - Speech-to-text transcription of recorded sales calls
//! - LLM completion used to extract questionnaire answers from transcripts
//! - Report renderers that turn a finished inspection into a document
//!
//! The design is provider-agnostic, enabling applications to swap between
//! different service providers (Whisper servers, YandexGPT, OpenAI, etc.)
//! without changing application code.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::report::InspectionReport;
pub use types::transcription::Transcript;
