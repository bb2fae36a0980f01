//! Gap Detector.
//!
//! A gap is a question of the inspection's questionnaire whose recorded answer
//! is still the sentinel — either a `NULL` ledger row or no row at all.
//! Detection is read-only and idempotent; the ordered gap list is what the
//! human reviewer sees and what `workflow::submit_answer` indexes into.

use crate::error::Error;
use crate::{inspections, questions, Id};
use entity_api::{answer, question};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;

/// Returns the inspection's unanswered questions in questionnaire order.
pub async fn find_gaps(
    db: &DatabaseConnection,
    inspection: &inspections::Model,
) -> Result<Vec<questions::Model>, Error> {
    let questions = question::find_by_questionnaire_id(db, inspection.questionnaire_id).await?;
    let answers: HashMap<Id, Option<String>> = answer::find_all_by_inspection(db, inspection.id)
        .await?
        .into_iter()
        .map(|answer| (answer.question_id, answer.answer_text))
        .collect();

    Ok(gaps_between(questions, &answers))
}

/// The set difference behind gap detection: questions whose answer is missing
/// or still the sentinel, in the order the questions were given.
pub fn gaps_between(
    questions: Vec<questions::Model>,
    answers: &HashMap<Id, Option<String>>,
) -> Vec<questions::Model> {
    questions
        .into_iter()
        .filter(|question| matches!(answers.get(&question.id), None | Some(None)))
        .collect()
}
