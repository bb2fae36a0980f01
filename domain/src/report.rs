//! Reporting collaborator.
//!
//! Assembles a finished inspection into an [`InspectionReport`] and renders it
//! through an [`report::Renderer`]. The built-in [`TextRenderer`] produces a
//! UTF-8 plain-text document; richer formats plug in behind the trait.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::{inspections, Id};
use entity_api::{answer, question, questionnaire};
use inspection_ai::traits::report::Renderer;
use inspection_ai::types::report::{InspectionReport, ReportEntry};
use inspection_ai::Error as ProviderError;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Assembles the report for a completed inspection from the answer ledger.
///
/// Fails with the `Report` kind if any question still has the sentinel — the
/// workflow only calls this once gap detection returns empty, so hitting that
/// branch means the ledger changed underneath us.
pub async fn build_report(
    db: &DatabaseConnection,
    inspection: &inspections::Model,
) -> Result<InspectionReport, Error> {
    let questionnaire = questionnaire::find_by_id(db, inspection.questionnaire_id).await?;
    let questions = question::find_by_questionnaire_id(db, inspection.questionnaire_id).await?;
    let answers: HashMap<Id, Option<String>> = answer::find_all_by_inspection(db, inspection.id)
        .await?
        .into_iter()
        .map(|answer| (answer.question_id, answer.answer_text))
        .collect();

    let mut entries = Vec::with_capacity(questions.len());
    for question in questions {
        let answer = answers
            .get(&question.id)
            .cloned()
            .flatten()
            .ok_or_else(|| Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Report(format!(
                    "question \"{}\" has no recorded answer",
                    question.prompt
                ))),
            })?;
        entries.push(ReportEntry {
            prompt: question.prompt,
            answer,
        });
    }

    Ok(InspectionReport {
        inspection_id: inspection.id.to_string(),
        questionnaire_name: questionnaire.name,
        entries,
        generated_at: chrono::Utc::now(),
    })
}

/// Renders the report with the given renderer, translating renderer failures
/// into the `Report` error kind.
pub fn render_report(
    renderer: &dyn Renderer,
    report: &InspectionReport,
) -> Result<Vec<u8>, Error> {
    renderer.render(report).map_err(|err| Error {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Report(
            "failed to render inspection report".to_string(),
        )),
    })
}

/// Built-in plain-text report renderer.
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, report: &InspectionReport) -> Result<Vec<u8>, ProviderError> {
        let mut document = String::new();

        let _ = writeln!(document, "Отчёт по проверке {}", report.inspection_id);
        let _ = writeln!(document, "Анкета: {}", report.questionnaire_name);
        let _ = writeln!(
            document,
            "Сформирован: {}",
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        document.push('\n');

        for (index, entry) in report.entries.iter().enumerate() {
            let _ = writeln!(document, "{}. {}", index + 1, entry.prompt);
            let _ = writeln!(document, "   {}", entry.answer);
            document.push('\n');
        }

        Ok(document.into_bytes())
    }

    fn content_type(&self) -> &str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> InspectionReport {
        InspectionReport {
            inspection_id: "9a41a1a0-8f9a-41d6-a31c-0a6d9b7be2cd".to_owned(),
            questionnaire_name: "Store visit call review".to_owned(),
            entries: vec![
                ReportEntry {
                    prompt: "Поздоровался ли продавец?".to_owned(),
                    answer: "Да, поздоровался".to_owned(),
                },
                ReportEntry {
                    prompt: "Был ли продавец вежлив?".to_owned(),
                    answer: "Вежлив".to_owned(),
                },
            ],
            generated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn text_renderer_numbers_entries_in_order() {
        let bytes = TextRenderer.render(&report()).unwrap();
        let document = String::from_utf8(bytes).unwrap();

        assert!(document.contains("Отчёт по проверке 9a41a1a0-8f9a-41d6-a31c-0a6d9b7be2cd"));
        assert!(document.contains("Анкета: Store visit call review"));
        assert!(document.contains("1. Поздоровался ли продавец?"));
        assert!(document.contains("   Да, поздоровался"));
        assert!(document.contains("2. Был ли продавец вежлив?"));
    }

    #[test]
    fn text_renderer_reports_plain_text_metadata() {
        assert_eq!(TextRenderer.content_type(), "text/plain; charset=utf-8");
        assert_eq!(TextRenderer.file_extension(), "txt");
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use crate::inspection_status::InspectionStatus;
    use crate::{answers, questionnaires, questions};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn build_report_fails_with_report_kind_when_a_sentinel_remains() {
        let now = chrono::Utc::now();
        let questionnaire_id = Id::new_v4();
        let inspection = inspections::Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            questionnaire_id,
            status: InspectionStatus::Complete,
            transcript: Some("Продавец: Добрый день!".to_owned()),
            report_generated_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let question = questions::Model {
            id: Id::new_v4(),
            questionnaire_id,
            position: 0,
            prompt: "Поздоровался ли продавец?".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        };
        let sentinel_row = answers::Model {
            id: Id::new_v4(),
            inspection_id: inspection.id,
            question_id: question.id,
            answer_text: None,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![questionnaires::Model {
                id: questionnaire_id,
                name: "Store visit call review".to_owned(),
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .append_query_results(vec![vec![question.clone()]])
            .append_query_results(vec![vec![sentinel_row]])
            .into_connection();

        let err = build_report(&db, &inspection).await.unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Report(_))
        ));
    }
}
