//! Transcript intake and refinement.
//!
//! Intake turns uploaded call audio into text through the transcription
//! provider. Raw speech-to-text output is a single undifferentiated block of
//! text; the completion model is then asked to rewrite it as a labeled
//! seller/customer dialogue so both the extraction prompt and the human
//! reviewer get readable input. Refinement is best-effort: any provider
//! failure keeps the raw transcript and logs a warning.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use inspection_ai::traits::{completion, transcription};
use inspection_ai::types::transcription::Config as TranscriptionConfig;
use log::*;

const REFINE_SYSTEM_PROMPT: &str = "Перед тобой расшифровка телефонного разговора продавца и \
покупателя. Перепиши её в виде диалога, помечая каждую реплику как «Продавец:» или \
«Покупатель:». Ничего не добавляй от себя и не сокращай содержание разговора.";

/// Transcribes uploaded call audio into text.
///
/// Without a transcript there is nothing to extract from, so any provider
/// failure surfaces as a `Validation` error telling the caller extraction
/// cannot start; the provider error is kept as the source.
pub async fn transcribe_call(
    provider: &dyn transcription::Provider,
    audio: Vec<u8>,
    config: TranscriptionConfig,
) -> Result<String, Error> {
    match provider.transcribe(audio, config).await {
        Ok(result) => {
            debug!(
                "Transcription produced {} character(s) of text",
                result.text.len()
            );
            Ok(result.text)
        }
        Err(err) => {
            warn!("Transcription failed, cannot start extraction: {err}");
            Err(Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(
                    "cannot start extraction: the call audio could not be transcribed"
                        .to_string(),
                )),
            })
        }
    }
}

/// Rewrites the raw transcript as a labeled dialogue, falling back to the raw
/// transcript on any provider error.
pub async fn refine(provider: &dyn completion::Provider, raw_transcript: &str) -> String {
    match provider.complete(REFINE_SYSTEM_PROMPT, raw_transcript).await {
        Ok(refined) if !refined.trim().is_empty() => refined.trim().to_owned(),
        Ok(_) => {
            warn!("Transcript refinement returned an empty reply, keeping the raw transcript");
            raw_transcript.to_owned()
        }
        Err(err) => {
            warn!("Transcript refinement failed, keeping the raw transcript: {err}");
            raw_transcript.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inspection_ai::Error as ProviderError;
    use mockall::mock;

    use inspection_ai::types::transcription::Transcript;

    mock! {
        pub Completion {}

        #[async_trait]
        impl completion::Provider for Completion {
            async fn complete(
                &self,
                system_prompt: &str,
                user_payload: &str,
            ) -> Result<String, ProviderError>;

            fn provider_id(&self) -> &'static str;

            async fn verify_credentials(&self) -> Result<bool, ProviderError>;
        }
    }

    mock! {
        pub Transcription {}

        #[async_trait]
        impl transcription::Provider for Transcription {
            async fn transcribe(
                &self,
                audio: Vec<u8>,
                config: TranscriptionConfig,
            ) -> Result<Transcript, ProviderError>;

            fn provider_id(&self) -> &'static str;

            async fn verify_credentials(&self) -> Result<bool, ProviderError>;
        }
    }

    #[tokio::test]
    async fn transcribe_call_returns_the_transcript_text() {
        let mut provider = MockTranscription::new();
        provider.expect_transcribe().returning(|_, _| {
            Ok(Transcript {
                text: "добрый день здравствуйте".to_owned(),
                language: Some("ru".to_owned()),
                duration_seconds: Some(3.2),
            })
        });

        let text = transcribe_call(&provider, vec![0u8; 16], TranscriptionConfig::default())
            .await
            .unwrap();

        assert_eq!(text, "добрый день здравствуйте");
    }

    #[tokio::test]
    async fn transcribe_call_failure_means_extraction_cannot_start() {
        let mut provider = MockTranscription::new();
        provider
            .expect_transcribe()
            .returning(|_, _| Err(ProviderError::Network("connection reset".to_owned())));

        let err = transcribe_call(&provider, vec![0u8; 16], TranscriptionConfig::default())
            .await
            .unwrap_err();

        match err.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Validation(message)) => {
                assert!(message.contains("cannot start extraction"));
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refine_returns_the_rewritten_dialogue() {
        let mut provider = MockCompletion::new();
        provider
            .expect_complete()
            .returning(|_, _| Ok("Продавец: Добрый день!\nПокупатель: Здравствуйте.".to_owned()));

        let refined = refine(&provider, "добрый день здравствуйте").await;

        assert!(refined.starts_with("Продавец:"));
    }

    #[tokio::test]
    async fn refine_falls_back_to_the_raw_transcript_on_provider_error() {
        let mut provider = MockCompletion::new();
        provider
            .expect_complete()
            .returning(|_, _| Err(ProviderError::Network("connection reset".to_owned())));

        let refined = refine(&provider, "добрый день здравствуйте").await;

        assert_eq!(refined, "добрый день здравствуйте");
    }

    #[tokio::test]
    async fn refine_falls_back_when_the_model_replies_with_nothing() {
        let mut provider = MockCompletion::new();
        provider.expect_complete().returning(|_, _| Ok("  ".to_owned()));

        let refined = refine(&provider, "добрый день").await;

        assert_eq!(refined, "добрый день");
    }
}
