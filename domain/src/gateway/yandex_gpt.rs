//! Yandex Foundation Models API client for transcript analysis.
//!
//! This module provides an HTTP client for the Yandex Foundation Models
//! completion REST endpoint, implementing the provider-agnostic
//! [`completion::Provider`] trait so the extraction adapter never depends on
//! the concrete vendor.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use inspection_ai::traits::completion;
use inspection_ai::Error as ProviderError;
use log::*;
use serde::{Deserialize, Serialize};
use service::config::Config;
use std::time::Duration;

/// Sampling temperature used for questionnaire analysis. Low on purpose so the
/// model sticks to what was actually said on the call.
const DEFAULT_TEMPERATURE: f64 = 0.3;

const MAX_TOKENS: u32 = 2000;

/// Request body for the `/completion` endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    model_uri: String,
    completion_options: CompletionOptions,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    text: String,
}

/// Documented response shape: the completion result is nested under `result`
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    result: Alternatives,
}

/// Older deployments reply with the alternatives at the top level
#[derive(Debug, Deserialize)]
struct Alternatives {
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    message: Message,
}

/// Normalizes the known completion response variants
/// (`result.alternatives[0].message.text` and bare `alternatives[...]`) into
/// the reply text, or a typed error carrying the offending payload.
fn message_text(body: &str) -> Result<String, ProviderError> {
    let alternatives = match serde_json::from_str::<CompletionResponse>(body) {
        Ok(response) => response.result.alternatives,
        Err(_) => match serde_json::from_str::<Alternatives>(body) {
            Ok(bare) => bare.alternatives,
            Err(err) => {
                return Err(ProviderError::Deserialization {
                    message: format!("Unrecognized completion response shape: {err}"),
                    raw: body.to_owned(),
                })
            }
        },
    };

    alternatives
        .into_iter()
        .next()
        .map(|alternative| alternative.message.text)
        .ok_or_else(|| ProviderError::Deserialization {
            message: "Completion response contained no alternatives".to_owned(),
            raw: body.to_owned(),
        })
}

/// Yandex Foundation Models API client
pub struct YandexGptClient {
    client: reqwest::Client,
    base_url: String,
    model_uri: String,
    temperature: f64,
}

impl YandexGptClient {
    /// Create a new client with the given API key, base URL and model URI
    /// (`gpt://{folder_id}/{model}/{version}`)
    pub fn new(
        api_key: &str,
        base_url: &str,
        model_uri: &str,
        timeout_secs: u64,
    ) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let mut header_value =
            reqwest::header::HeaderValue::from_str(&format!("Api-Key {api_key}")).map_err(|e| {
                warn!("Failed to create auth header: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                        "Invalid API key format".to_string(),
                    )),
                }
            })?;
        header_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            model_uri: model_uri.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Create a client from the application config
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let api_key = config.yandex_api_key().ok_or_else(|| {
            warn!("No Yandex API key configured");
            Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        })?;
        let folder_id = config.yandex_folder_id().ok_or_else(|| {
            warn!("No Yandex folder ID configured");
            Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        })?;
        let model_uri = format!(
            "gpt://{}/{}/{}",
            folder_id,
            config.yandex_model(),
            config.yandex_model_version()
        );

        Self::new(
            &api_key,
            config.yandex_api_base_url(),
            &model_uri,
            config.completion_timeout_secs,
        )
    }

    async fn post_completion(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/completion", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Completion request failed: {:?}", e);
                if e.is_timeout() {
                    ProviderError::Timeout(format!("Completion request timed out: {e}"))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read completion response body: {:?}", e);
            ProviderError::Network(e.to_string())
        })?;

        if status.is_success() {
            message_text(&body)
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            error!("Completion API rejected credentials: {}", body);
            Err(ProviderError::Authentication(body))
        } else {
            error!("Completion API: {}", body);
            Err(ProviderError::Provider(format!("{status}: {body}")))
        }
    }
}

#[async_trait]
impl completion::Provider for YandexGptClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_payload: &str,
    ) -> Result<String, ProviderError> {
        debug!(
            "Sending completion request ({} payload bytes) to {}",
            user_payload.len(),
            self.model_uri
        );

        let request = CompletionRequest {
            model_uri: self.model_uri.clone(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: self.temperature,
                max_tokens: MAX_TOKENS,
            },
            messages: vec![
                Message {
                    role: "system".to_string(),
                    text: system_prompt.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    text: user_payload.to_string(),
                },
            ],
        };

        self.post_completion(&request).await
    }

    fn provider_id(&self) -> &str {
        "yandex_gpt"
    }

    async fn verify_credentials(&self) -> Result<bool, ProviderError> {
        let request = CompletionRequest {
            model_uri: self.model_uri.clone(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: 0.0,
                max_tokens: 1,
            },
            messages: vec![Message {
                role: "user".to_string(),
                text: "ping".to_string(),
            }],
        };

        match self.post_completion(&request).await {
            Ok(_) => Ok(true),
            Err(ProviderError::Authentication(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspection_ai::traits::completion::Provider;

    fn client(base_url: &str) -> YandexGptClient {
        YandexGptClient::new("test-key", base_url, "gpt://folder/yandexgpt/rc", 5).unwrap()
    }

    #[tokio::test]
    async fn complete_returns_the_reply_from_the_nested_response_shape() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/completion")
            .match_header("authorization", "Api-Key test-key")
            .with_status(200)
            .with_body(
                r#"{"result": {"alternatives": [{"message": {"role": "assistant", "text": "{\"1\": \"Да\"}"}, "status": "ALTERNATIVE_STATUS_FINAL"}], "usage": {"totalTokens": "42"}}}"#,
            )
            .create_async()
            .await;

        let reply = client(&server.url())
            .complete("система", "разговор")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "{\"1\": \"Да\"}");
    }

    #[tokio::test]
    async fn complete_handles_the_bare_alternatives_response_shape() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/completion")
            .with_status(200)
            .with_body(r#"{"alternatives": [{"message": {"role": "assistant", "text": "ответ"}}]}"#)
            .create_async()
            .await;

        let reply = client(&server.url())
            .complete("система", "разговор")
            .await
            .unwrap();

        assert_eq!(reply, "ответ");
    }

    #[tokio::test]
    async fn complete_surfaces_an_unrecognized_body_as_deserialization_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/completion")
            .with_status(200)
            .with_body("Internal text that is not JSON")
            .create_async()
            .await;

        let result = client(&server.url()).complete("система", "разговор").await;

        match result {
            Err(ProviderError::Deserialization { raw, .. }) => {
                assert_eq!(raw, "Internal text that is not JSON");
            }
            other => panic!("expected Deserialization error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn complete_maps_a_server_error_to_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/completion")
            .with_status(500)
            .with_body("model overloaded")
            .create_async()
            .await;

        let result = client(&server.url()).complete("система", "разговор").await;

        assert!(matches!(result, Err(ProviderError::Provider(_))));
    }

    #[tokio::test]
    async fn verify_credentials_returns_false_on_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/completion")
            .with_status(401)
            .with_body(r#"{"error": "invalid api key"}"#)
            .create_async()
            .await;

        let valid = client(&server.url()).verify_credentials().await.unwrap();

        assert!(!valid);
    }
}
