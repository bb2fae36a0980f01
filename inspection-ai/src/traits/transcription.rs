//! Transcription provider trait.

use crate::types::transcription::{Config, Transcript};
use crate::Error;
use async_trait::async_trait;

/// Abstraction for speech-to-text transcription services.
///
/// Implementations convert a recorded sales call into plain text. Supports
/// self-hosted Whisper servers as well as hosted speech APIs. This trait
/// enables provider swapping for cost optimization and quality comparison.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Transcribe the given audio bytes synchronously.
    ///
    /// Blocks until the provider returns the full transcript; callers should
    /// treat this as a single long-running step with its own timeout.
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        config: Config,
    ) -> std::result::Result<Transcript, Error>;

    /// Return unique identifier for this provider (e.g., "whisper").
    ///
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;

    /// Validate API credentials by making a lightweight test request.
    ///
    /// Returns false if credentials are invalid, expired, or lack
    /// transcription permissions.
    async fn verify_credentials(&self) -> std::result::Result<bool, Error>;
}
