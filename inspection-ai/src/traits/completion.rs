//! LLM completion provider trait.

use crate::Error;
use async_trait::async_trait;

/// Abstraction for LLM completion services used to analyze transcripts.
///
/// Implementations send a system prompt plus a user payload to a remote
/// completion model and return the raw textual reply. Supports YandexGPT,
/// OpenAI-compatible endpoints, and similar chat-completion APIs. The answer
/// extraction adapter is the sole caller for questionnaire analysis; it owns
/// parsing of the raw reply.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run a single completion request and return the model's raw text reply.
    ///
    /// Processing typically takes seconds to a minute depending on payload
    /// size and model; implementations must enforce a request timeout.
    async fn complete(
        &self,
        system_prompt: &str,
        user_payload: &str,
    ) -> std::result::Result<String, Error>;

    /// Return unique identifier for this provider (e.g., "yandex_gpt").
    ///
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;

    /// Validate API credentials by making a lightweight test request.
    async fn verify_credentials(&self) -> std::result::Result<bool, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Completion {}

        #[async_trait]
        impl Provider for Completion {
            async fn complete(
                &self,
                system_prompt: &str,
                user_payload: &str,
            ) -> std::result::Result<String, Error>;

            fn provider_id(&self) -> &'static str;

            async fn verify_credentials(&self) -> std::result::Result<bool, Error>;
        }
    }

    #[tokio::test]
    async fn mocked_provider_returns_the_configured_reply() {
        let mut provider = MockCompletion::new();
        provider
            .expect_complete()
            .with(eq("system"), eq("payload"))
            .returning(|_, _| Ok("{\"1\": \"Да\"}".to_owned()));

        let reply = provider.complete("system", "payload").await.unwrap();

        assert_eq!(reply, "{\"1\": \"Да\"}");
    }
}
