//! OpenAI-compatible Whisper transcription server client.
//!
//! Speaks the `/audio/transcriptions` multipart protocol, so it works against
//! a self-hosted faster-whisper server as well as the hosted OpenAI API.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use inspection_ai::traits::transcription;
use inspection_ai::types::transcription::{Config as TranscriptionConfig, Transcript};
use inspection_ai::Error as ProviderError;
use log::*;
use serde::Deserialize;
use service::config::Config;
use std::time::Duration;

const DEFAULT_MODEL: &str = "whisper-1";

/// Verbose JSON response from `/audio/transcriptions`
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// Whisper transcription server client
pub struct WhisperClient {
    client: reqwest::Client,
    base_url: String,
}

impl WhisperClient {
    /// Create a new client for the given base URL. `api_key` is optional
    /// because self-hosted servers commonly run without authentication.
    pub fn new(base_url: &str, api_key: Option<&str>, timeout_secs: u64) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(api_key) = api_key {
            let mut header_value =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(
                    |e| {
                        warn!("Failed to create auth header: {:?}", e);
                        Error {
                            source: Some(Box::new(e)),
                            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                                "Invalid API key format".to_string(),
                            )),
                        }
                    },
                )?;
            header_value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, header_value);
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Create a client from the application config
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(
            config.whisper_base_url(),
            config.whisper_api_key().as_deref(),
            config.transcription_timeout_secs,
        )
    }
}

#[async_trait]
impl transcription::Provider for WhisperClient {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        config: TranscriptionConfig,
    ) -> Result<Transcript, ProviderError> {
        let url = format!("{}/audio/transcriptions", self.base_url);
        let file_name = config.file_name.unwrap_or_else(|| "call.mp3".to_string());

        debug!("Transcribing {} audio bytes as {}", audio.len(), file_name);

        let file_part = reqwest::multipart::Part::bytes(audio).file_name(file_name);
        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", DEFAULT_MODEL)
            .text("response_format", "verbose_json");
        if let Some(language) = config.language {
            form = form.text("language", language);
        }

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Transcription request failed: {:?}", e);
                if e.is_timeout() {
                    ProviderError::Timeout(format!("Transcription request timed out: {e}"))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read transcription response body: {:?}", e);
            ProviderError::Network(e.to_string())
        })?;

        if status.is_success() {
            let parsed: TranscriptionResponse =
                serde_json::from_str(&body).map_err(|e| ProviderError::Deserialization {
                    message: format!("Unrecognized transcription response: {e}"),
                    raw: body.clone(),
                })?;

            info!(
                "Transcription finished ({} chars, language {:?})",
                parsed.text.len(),
                parsed.language
            );

            Ok(Transcript {
                text: parsed.text,
                language: parsed.language,
                duration_seconds: parsed.duration,
            })
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            error!("Transcription server rejected credentials: {}", body);
            Err(ProviderError::Authentication(body))
        } else {
            error!("Transcription server: {}", body);
            Err(ProviderError::Provider(format!("{status}: {body}")))
        }
    }

    fn provider_id(&self) -> &str {
        "whisper"
    }

    async fn verify_credentials(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to reach transcription server: {:?}", e);
            ProviderError::Network(e.to_string())
        })?;

        Ok(response.status().is_success())
    }
}
