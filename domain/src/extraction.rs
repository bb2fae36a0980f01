//! Answer Extraction Adapter.
//!
//! Turns a call transcript plus an ordered question list into one candidate
//! answer (or the "no answer" sentinel) per question, by prompting the
//! completion model for a JSON object keyed by question number.
//!
//! The adapter owns reply hygiene: markdown fences are stripped before
//! parsing, the sentinel spellings (`null`, `"null"`, blank) are normalized to
//! `None`, unknown question numbers are logged and dropped, and an unparsable
//! reply surfaces as a typed `ExtractionParse` error carrying the raw text —
//! it is never silently treated as "all gaps" here.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use crate::{questions, Id};
use inspection_ai::traits::completion;
use log::*;
use std::collections::HashMap;

const EXTRACTION_SYSTEM_PROMPT: &str = "Ты помощник отдела контроля качества. Тебе дают \
расшифровку телефонного разговора продавца с тайным покупателем и нумерованный список вопросов. \
Ответь на каждый вопрос по содержанию разговора. Верни только JSON-объект без пояснений и без \
markdown: ключ — номер вопроса, значение — краткий ответ, либо null, если в разговоре нет \
ответа на этот вопрос.";

/// Runs the extraction for the given transcript against the ordered question
/// list. The returned map has exactly one entry per input question.
pub async fn extract(
    provider: &dyn completion::Provider,
    transcript: &str,
    questions: &[questions::Model],
) -> Result<HashMap<Id, Option<String>>, Error> {
    let payload = build_payload(transcript, questions);

    debug!(
        "Requesting answer extraction for {} question(s)",
        questions.len()
    );

    let reply = provider
        .complete(EXTRACTION_SYSTEM_PROMPT, &payload)
        .await?;

    let by_number = parse_answer_mapping(&reply, questions.len())?;

    // One entry per question; numbers the model skipped become the sentinel
    let mut mapping = HashMap::with_capacity(questions.len());
    for (index, question) in questions.iter().enumerate() {
        let value = by_number.get(&(index + 1)).cloned().flatten();
        mapping.insert(question.id, value);
    }

    Ok(mapping)
}

/// Builds the user payload: numbered questions followed by the transcript.
fn build_payload(transcript: &str, questions: &[questions::Model]) -> String {
    let mut payload = String::from("Вопросы:\n");
    for (index, question) in questions.iter().enumerate() {
        payload.push_str(&format!("{}. {}\n", index + 1, question.prompt));
    }
    payload.push_str("\nРазговор:\n");
    payload.push_str(transcript);
    payload
}

/// Strips markdown code fences (``` and ```json) and surrounding whitespace
/// that completion models like to wrap JSON replies in.
pub fn sanitize_model_reply(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let without_close = without_open.strip_suffix("```").unwrap_or(without_open);
    without_close.trim()
}

/// Parses the model reply into a question-number -> answer map.
///
/// Numbers outside `1..=question_count` are logged and dropped. Anything that
/// is not a JSON object after sanitizing fails with `ExtractionParse`.
pub fn parse_answer_mapping(
    reply: &str,
    question_count: usize,
) -> Result<HashMap<usize, Option<String>>, Error> {
    let sanitized = sanitize_model_reply(reply);

    let value: serde_json::Value = serde_json::from_str(sanitized).map_err(|err| Error {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::External(ExternalErrorKind::ExtractionParse {
            raw: reply.to_owned(),
        }),
    })?;

    let object = match value {
        serde_json::Value::Object(object) => object,
        other => {
            warn!("Extraction reply is valid JSON but not an object: {other}");
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::ExtractionParse {
                    raw: reply.to_owned(),
                }),
            });
        }
    };

    let mut mapping = HashMap::with_capacity(object.len());
    for (key, value) in object {
        let number = match key.trim().parse::<usize>() {
            Ok(number) if (1..=question_count).contains(&number) => number,
            _ => {
                warn!("Dropping unknown question number {key:?} from extraction reply");
                continue;
            }
        };
        mapping.insert(number, normalize_answer(value));
    }

    Ok(mapping)
}

/// Normalizes one reply value: JSON `null`, the literal strings
/// "null"/"NULL" and blank strings all become the sentinel.
fn normalize_answer(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inspection_ai::Error as ProviderError;
    use mockall::mock;

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

    fn question(position: i32, prompt: &str) -> questions::Model {
        let now = chrono::Utc::now();
        questions::Model {
            id: Id::new_v4(),
            questionnaire_id: Id::new_v4(),
            position,
            prompt: prompt.to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn sanitize_strips_markdown_fences() {
        assert_eq!(
            sanitize_model_reply("```json\n{\"1\": \"Да\"}\n```"),
            "{\"1\": \"Да\"}"
        );
        assert_eq!(sanitize_model_reply("```\n{}\n```"), "{}");
        assert_eq!(sanitize_model_reply("  {\"1\": null} "), "{\"1\": null}");
    }

    #[test]
    fn parse_normalizes_all_sentinel_spellings() {
        let mapping = parse_answer_mapping(
            r#"{"1": "Да", "2": null, "3": "null", "4": "NULL", "5": "  "}"#,
            5,
        )
        .unwrap();

        assert_eq!(mapping[&1].as_deref(), Some("Да"));
        assert_eq!(mapping[&2], None);
        assert_eq!(mapping[&3], None);
        assert_eq!(mapping[&4], None);
        assert_eq!(mapping[&5], None);
    }

    #[test]
    fn parse_drops_unknown_question_numbers() {
        let mapping =
            parse_answer_mapping(r#"{"1": "Да", "7": "лишний", "abc": "мусор"}"#, 2).unwrap();

        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[&1].as_deref(), Some("Да"));
    }

    #[test]
    fn parse_failure_carries_the_raw_reply() {
        let raw = "Извините, я не могу ответить в формате JSON";

        let err = parse_answer_mapping(raw, 3).unwrap_err();

        match err.error_kind {
            DomainErrorKind::External(ExternalErrorKind::ExtractionParse { raw: kept }) => {
                assert_eq!(kept, raw);
            }
            other => panic!("expected ExtractionParse, got {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_a_non_object_reply() {
        let err = parse_answer_mapping(r#"["Да", "Нет"]"#, 2).unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::ExtractionParse { .. })
        ));
    }

    #[tokio::test]
    async fn extract_returns_one_entry_per_question() {
        let questions = vec![
            question(0, "Поздоровался ли продавец?"),
            question(1, "Упоминал ли продавец акции?"),
            question(2, "Был ли продавец вежлив?"),
        ];

        let mut provider = MockCompletion::new();
        provider
            .expect_complete()
            .returning(|_, _| Ok(r#"{"1": "Да", "2": null, "3": "нет"}"#.to_owned()));

        let mapping = extract(&provider, "Продавец: Добрый день!", &questions)
            .await
            .unwrap();

        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping[&questions[0].id].as_deref(), Some("Да"));
        assert_eq!(mapping[&questions[1].id], None);
        assert_eq!(mapping[&questions[2].id].as_deref(), Some("нет"));
    }

    #[tokio::test]
    async fn extract_treats_skipped_numbers_as_the_sentinel() {
        let questions = vec![
            question(0, "Поздоровался ли продавец?"),
            question(1, "Был ли продавец вежлив?"),
        ];

        let mut provider = MockCompletion::new();
        provider
            .expect_complete()
            .returning(|_, _| Ok(r#"{"2": "Вежлив"}"#.to_owned()));

        let mapping = extract(&provider, "разговор", &questions).await.unwrap();

        assert_eq!(mapping[&questions[0].id], None);
        assert_eq!(mapping[&questions[1].id].as_deref(), Some("Вежлив"));
    }

    #[tokio::test]
    async fn extract_surfaces_an_unparsable_reply_as_extraction_parse() {
        let questions = vec![question(0, "Поздоровался ли продавец?")];

        let mut provider = MockCompletion::new();
        provider
            .expect_complete()
            .returning(|_, _| Ok("Не могу помочь с этим запросом".to_owned()));

        let err = extract(&provider, "разговор", &questions).await.unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::ExtractionParse { .. })
        ));
    }
}
