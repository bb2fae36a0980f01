//! Completion workflow for inspections.
//!
//! Drives the persisted state machine
//! `Transcribed -> Extracting -> AwaitingHuman -> Complete`. Extraction fails
//! open: any provider failure leaves the ledger untouched and hands the full
//! question set to human intake. Entering `Complete` fires the reporting
//! collaborator exactly once per inspection, guarded by
//! `mark_report_generated`.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::inspection_status::InspectionStatus;
use crate::{extraction, gaps, inspection, report, transcript};
use crate::{inspections, questions, Id};
use entity_api::{answer, question};
use inspection_ai::traits::completion;
use log::*;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Serializes human intake per inspection. Distinct inspections proceed
/// independently; two concurrent answers for the same inspection are applied
/// one after the other against a consistent gap list.
#[derive(Default)]
pub struct InspectionLocks {
    locks: Mutex<HashMap<Id, Arc<Mutex<()>>>>,
}

impl InspectionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_for(&self, inspection_id: Id) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(inspection_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // A completed inspection rejects further answers, so its entry can go;
    // in-flight holders keep their own Arc and finish undisturbed.
    async fn evict(&self, inspection_id: Id) {
        self.locks.lock().await.remove(&inspection_id);
    }
}

/// Result of one extraction run.
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub inspection: inspections::Model,
    /// Unanswered questions in questionnaire order
    pub gaps: Vec<questions::Model>,
    /// Set when extraction failed and the workflow fell open to human intake
    pub warning: Option<String>,
}

/// Result of one human answer submission.
#[derive(Debug)]
pub struct AnswerOutcome {
    pub inspection: inspections::Model,
    pub remaining_gaps: Vec<questions::Model>,
}

/// Runs model extraction for a freshly transcribed inspection.
///
/// On success the extracted mapping is upserted into the ledger and the
/// inspection moves to `AwaitingHuman`, or straight to `Complete` when no
/// gaps remain. On any provider failure nothing is written and the inspection
/// moves to `AwaitingHuman` with the full question set as gaps.
pub async fn run_extraction(
    db: &DatabaseConnection,
    provider: &dyn completion::Provider,
    inspection_id: Id,
) -> Result<ExtractionOutcome, Error> {
    let found = inspection::find_by_id(db, inspection_id).await?;

    if found.status != InspectionStatus::Transcribed {
        return Err(validation(format!(
            "inspection {inspection_id} is not awaiting extraction (status: {})",
            found.status
        )));
    }
    let raw_transcript = found.transcript.clone().ok_or_else(|| {
        validation(format!("inspection {inspection_id} has no stored transcript"))
    })?;

    let mut current =
        entity_api::inspection::update_status(db, inspection_id, InspectionStatus::Extracting)
            .await?;

    let refined = transcript::refine(provider, &raw_transcript).await;
    if refined != raw_transcript {
        current =
            entity_api::inspection::update_transcript(db, inspection_id, refined.clone()).await?;
    }

    let questions = question::find_by_questionnaire_id(db, current.questionnaire_id).await?;

    match extraction::extract(provider, &refined, &questions).await {
        Ok(mapping) => {
            // Upsert in questionnaire order so the ledger write order is stable
            for question in &questions {
                let value = mapping.get(&question.id).cloned().flatten();
                answer::upsert(db, inspection_id, question.id, value).await?;
            }

            let gaps = gaps::find_gaps(db, &current).await?;
            let inspection = if gaps.is_empty() {
                finalize(db, inspection_id).await?
            } else {
                info!(
                    "Extraction left {} gap(s) for inspection {inspection_id}",
                    gaps.len()
                );
                entity_api::inspection::update_status(
                    db,
                    inspection_id,
                    InspectionStatus::AwaitingHuman,
                )
                .await?
            };

            Ok(ExtractionOutcome {
                inspection,
                gaps,
                warning: None,
            })
        }
        // Fail open: the ledger stays untouched and every question becomes a
        // gap for the human reviewer.
        Err(err) if matches!(err.error_kind, DomainErrorKind::External(_)) => {
            warn!(
                "Answer extraction failed for inspection {inspection_id}, \
                 falling open to human intake: {err}"
            );

            let inspection = entity_api::inspection::update_status(
                db,
                inspection_id,
                InspectionStatus::AwaitingHuman,
            )
            .await?;

            Ok(ExtractionOutcome {
                inspection,
                gaps: questions,
                warning: Some(
                    "answer extraction failed; every question needs a manual answer".to_string(),
                ),
            })
        }
        Err(err) => Err(err),
    }
}

/// Records one human answer against the current ordered gap list.
///
/// `gap_index` is 1-based into the gap list as last presented. Out-of-range
/// indexes and blank text are rejected with `Validation` and leave all state
/// unchanged. When the last gap closes the inspection transitions to
/// `Complete` and its entry in the lock registry is released.
pub async fn submit_answer(
    db: &DatabaseConnection,
    locks: &InspectionLocks,
    inspection_id: Id,
    gap_index: usize,
    text: &str,
) -> Result<AnswerOutcome, Error> {
    let lock = locks.lock_for(inspection_id).await;
    let _guard = lock.lock().await;

    let found = inspection::find_by_id(db, inspection_id).await?;
    if found.status != InspectionStatus::AwaitingHuman {
        return Err(validation(format!(
            "inspection {inspection_id} is not awaiting human answers (status: {})",
            found.status
        )));
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(validation("answer text must not be empty".to_string()));
    }

    let gaps = gaps::find_gaps(db, &found).await?;
    let position = validate_gap_index(gap_index, gaps.len())?;
    let question = &gaps[position];

    answer::upsert(db, inspection_id, question.id, Some(trimmed.to_owned())).await?;
    info!(
        "Recorded human answer for inspection {inspection_id}, question \"{}\"",
        question.prompt
    );

    let remaining_gaps = gaps::find_gaps(db, &found).await?;
    let inspection = if remaining_gaps.is_empty() {
        let inspection = finalize(db, inspection_id).await?;
        drop(_guard);
        locks.evict(inspection_id).await;
        inspection
    } else {
        found
    };

    Ok(AnswerOutcome {
        inspection,
        remaining_gaps,
    })
}

/// Validates a 1-based gap index against the current gap count, returning the
/// 0-based position.
pub fn validate_gap_index(gap_index: usize, gap_count: usize) -> Result<usize, Error> {
    if gap_index == 0 || gap_index > gap_count {
        return Err(validation(format!(
            "gap index {gap_index} is out of range; {gap_count} gap(s) outstanding"
        )));
    }
    Ok(gap_index - 1)
}

/// Transitions the inspection to `Complete` and fires the report trigger if
/// this completion is the first one. Report generation failures are logged
/// and do not roll the state back; the report stays renderable on demand.
async fn finalize(db: &DatabaseConnection, inspection_id: Id) -> Result<inspections::Model, Error> {
    let inspection =
        entity_api::inspection::update_status(db, inspection_id, InspectionStatus::Complete)
            .await?;

    if entity_api::inspection::mark_report_generated(db, inspection_id).await? {
        info!("Inspection {inspection_id} is complete; generating report");
        match report::build_report(db, &inspection).await {
            Ok(built) => match report::render_report(&report::TextRenderer, &built) {
                Ok(bytes) => info!(
                    "Generated report for inspection {inspection_id} ({} answer(s), {} bytes)",
                    built.entries.len(),
                    bytes.len()
                ),
                Err(err) => warn!(
                    "Report rendering failed for inspection {inspection_id}; \
                     it stays available on demand: {err}"
                ),
            },
            Err(err) => warn!(
                "Report assembly failed for inspection {inspection_id}; \
                 it stays available on demand: {err}"
            ),
        }
    } else {
        debug!("Report for inspection {inspection_id} was already generated, skipping trigger");
    }

    Ok(inspection)
}

fn validation(message: String) -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_index_is_one_based() {
        assert_eq!(validate_gap_index(1, 3).unwrap(), 0);
        assert_eq!(validate_gap_index(3, 3).unwrap(), 2);
    }

    #[test]
    fn gap_index_zero_and_past_the_end_are_rejected() {
        for (index, count) in [(0, 3), (4, 3), (1, 0)] {
            let err = validate_gap_index(index, count).unwrap_err();
            assert!(matches!(
                err.error_kind,
                DomainErrorKind::Internal(InternalErrorKind::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn evicting_an_inspection_empties_its_lock_entry() {
        let locks = InspectionLocks::new();
        let inspection_id = Id::new_v4();

        let lock = locks.lock_for(inspection_id).await;
        drop(lock);
        assert_eq!(locks.locks.lock().await.len(), 1);

        locks.evict(inspection_id).await;
        assert!(locks.locks.lock().await.is_empty());
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::answers;
    use async_trait::async_trait;
    use inspection_ai::Error as ProviderError;
    use mockall::mock;
    use sea_orm::{DatabaseBackend, MockDatabase};

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

    const RAW_TRANSCRIPT: &str = "добрый день здравствуйте подскажите по акциям";
    const REFINED_TRANSCRIPT: &str =
        "Продавец: Добрый день!\nПокупатель: Здравствуйте, подскажите по акциям.";

    fn inspection(status: InspectionStatus, transcript: &str) -> inspections::Model {
        let now = chrono::Utc::now();
        inspections::Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            questionnaire_id: Id::new_v4(),
            status,
            transcript: Some(transcript.to_owned()),
            report_generated_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn question(questionnaire_id: Id, position: i32, prompt: &str) -> questions::Model {
        let now = chrono::Utc::now();
        questions::Model {
            id: Id::new_v4(),
            questionnaire_id,
            position,
            prompt: prompt.to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn answer_row(
        inspection_id: Id,
        question_id: Id,
        answer_text: Option<&str>,
    ) -> answers::Model {
        let now = chrono::Utc::now();
        answers::Model {
            id: Id::new_v4(),
            inspection_id,
            question_id,
            answer_text: answer_text.map(|text| text.to_owned()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn with_status(model: &inspections::Model, status: InspectionStatus) -> inspections::Model {
        let mut updated = model.clone();
        updated.status = status;
        updated
    }

    #[tokio::test]
    async fn run_extraction_records_answers_and_awaits_the_human_for_gaps() {
        let transcribed = inspection(InspectionStatus::Transcribed, RAW_TRANSCRIPT);
        let extracting = with_status(&transcribed, InspectionStatus::Extracting);
        let mut refined = extracting.clone();
        refined.transcript = Some(REFINED_TRANSCRIPT.to_owned());
        let awaiting = with_status(&refined, InspectionStatus::AwaitingHuman);

        let first = question(transcribed.questionnaire_id, 0, "Поздоровался ли продавец?");
        let second = question(transcribed.questionnaire_id, 1, "Упоминал ли продавец акции?");
        let first_row = answer_row(transcribed.id, first.id, Some("Да"));
        let second_row = answer_row(transcribed.id, second.id, None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // find_by_id
            .append_query_results(vec![vec![transcribed.clone()]])
            // update_status -> Extracting (find, then update)
            .append_query_results(vec![vec![transcribed.clone()], vec![extracting.clone()]])
            // update_transcript (find, then update)
            .append_query_results(vec![vec![extracting.clone()], vec![refined.clone()]])
            // ordered questions
            .append_query_results(vec![vec![first.clone(), second.clone()]])
            // upsert per question: pair lookup misses, then the inserted row
            .append_query_results(vec![Vec::<answers::Model>::new()])
            .append_query_results(vec![vec![first_row.clone()]])
            .append_query_results(vec![Vec::<answers::Model>::new()])
            .append_query_results(vec![vec![second_row.clone()]])
            // gap detection: questions, then ledger rows
            .append_query_results(vec![vec![first.clone(), second.clone()]])
            .append_query_results(vec![vec![first_row, second_row]])
            // update_status -> AwaitingHuman (find, then update)
            .append_query_results(vec![vec![refined.clone()], vec![awaiting.clone()]])
            .into_connection();

        let mut provider = MockCompletion::new();
        provider
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok(REFINED_TRANSCRIPT.to_owned()));
        provider
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok(r#"{"1": "Да", "2": null}"#.to_owned()));

        let outcome = run_extraction(&db, &provider, transcribed.id).await.unwrap();

        assert_eq!(outcome.inspection.status, InspectionStatus::AwaitingHuman);
        assert!(outcome.warning.is_none());
        assert_eq!(outcome.gaps.len(), 1);
        assert_eq!(outcome.gaps[0].id, second.id);
    }

    #[tokio::test]
    async fn run_extraction_fails_open_without_writing_partial_answers() {
        let transcribed = inspection(InspectionStatus::Transcribed, RAW_TRANSCRIPT);
        let extracting = with_status(&transcribed, InspectionStatus::Extracting);
        let mut refined = extracting.clone();
        refined.transcript = Some(REFINED_TRANSCRIPT.to_owned());
        let awaiting = with_status(&refined, InspectionStatus::AwaitingHuman);

        let first = question(transcribed.questionnaire_id, 0, "Поздоровался ли продавец?");
        let second = question(transcribed.questionnaire_id, 1, "Упоминал ли продавец акции?");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![transcribed.clone()]])
            .append_query_results(vec![vec![transcribed.clone()], vec![extracting.clone()]])
            .append_query_results(vec![vec![extracting.clone()], vec![refined.clone()]])
            .append_query_results(vec![vec![first.clone(), second.clone()]])
            // extraction fails; the only remaining statements are the
            // AwaitingHuman status transition
            .append_query_results(vec![vec![refined.clone()], vec![awaiting.clone()]])
            .into_connection();

        let mut provider = MockCompletion::new();
        provider
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok(REFINED_TRANSCRIPT.to_owned()));
        provider
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("Не могу ответить в формате JSON".to_owned()));

        let outcome = run_extraction(&db, &provider, transcribed.id).await.unwrap();

        assert_eq!(outcome.inspection.status, InspectionStatus::AwaitingHuman);
        assert!(outcome.warning.is_some());
        assert_eq!(outcome.gaps.len(), 2);

        // No ledger rows were written on the failure path
        let statements = db.into_transaction_log();
        assert!(!statements
            .iter()
            .any(|statement| format!("{statement:?}").contains("INSERT INTO")));
    }

    #[tokio::test]
    async fn run_extraction_rejects_an_inspection_that_is_not_transcribed() {
        let complete = inspection(InspectionStatus::Complete, RAW_TRANSCRIPT);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![complete.clone()]])
            .into_connection();

        let provider = MockCompletion::new();

        let err = run_extraction(&db, &provider, complete.id).await.unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        ));
    }

    #[tokio::test]
    async fn submit_answer_closes_the_last_gap_and_completes_the_inspection() {
        let awaiting = inspection(InspectionStatus::AwaitingHuman, REFINED_TRANSCRIPT);
        let complete = with_status(&awaiting, InspectionStatus::Complete);

        let only = question(awaiting.questionnaire_id, 0, "Поздоровался ли продавец?");
        let sentinel_row = answer_row(awaiting.id, only.id, None);
        let filled_row = answer_row(awaiting.id, only.id, Some("Да, поздоровался"));

        let questionnaire_row = crate::questionnaires::Model {
            id: awaiting.questionnaire_id,
            name: "Store visit call review".to_owned(),
            created_at: awaiting.created_at,
            updated_at: awaiting.updated_at,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // find_by_id
            .append_query_results(vec![vec![awaiting.clone()]])
            // gap detection: questions, ledger
            .append_query_results(vec![vec![only.clone()]])
            .append_query_results(vec![vec![sentinel_row.clone()]])
            // upsert: pair lookup hits, then the overwritten row
            .append_query_results(vec![vec![sentinel_row], vec![filled_row.clone()]])
            // gap recomputation: questions, ledger
            .append_query_results(vec![vec![only.clone()]])
            .append_query_results(vec![vec![filled_row.clone()]])
            // finalize: update_status -> Complete (find, update)
            .append_query_results(vec![vec![awaiting.clone()], vec![complete.clone()]])
            // mark_report_generated wins the stamp
            .append_exec_results(vec![sea_orm::MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // report assembly: questionnaire, questions, ledger
            .append_query_results(vec![vec![questionnaire_row]])
            .append_query_results(vec![vec![only.clone()]])
            .append_query_results(vec![vec![filled_row]])
            .into_connection();

        let locks = InspectionLocks::new();

        let outcome = submit_answer(&db, &locks, awaiting.id, 1, " Да, поздоровался ")
            .await
            .unwrap();

        assert_eq!(outcome.inspection.status, InspectionStatus::Complete);
        assert!(outcome.remaining_gaps.is_empty());
        // The completed inspection no longer occupies the lock registry
        assert!(locks.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn submit_answer_rejects_an_out_of_range_gap_index() {
        let awaiting = inspection(InspectionStatus::AwaitingHuman, REFINED_TRANSCRIPT);
        let only = question(awaiting.questionnaire_id, 0, "Поздоровался ли продавец?");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![awaiting.clone()]])
            .append_query_results(vec![vec![only.clone()]])
            .append_query_results(vec![Vec::<answers::Model>::new()])
            .into_connection();

        let locks = InspectionLocks::new();

        let err = submit_answer(&db, &locks, awaiting.id, 2, "Да")
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        ));
    }

    #[tokio::test]
    async fn submit_answer_rejects_blank_text_before_touching_the_ledger() {
        let awaiting = inspection(InspectionStatus::AwaitingHuman, REFINED_TRANSCRIPT);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![awaiting.clone()]])
            .into_connection();

        let locks = InspectionLocks::new();

        let err = submit_answer(&db, &locks, awaiting.id, 1, "   ")
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        ));
    }
}
