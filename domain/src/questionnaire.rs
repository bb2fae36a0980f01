//! Questionnaire administration and lookup.
//!
//! Questionnaires are read-only while inspections run against them; `create`
//! exists for seeding and operational setup.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::{questionnaires, questions, Id};
use entity_api::{question, questionnaire};
use log::*;
use sea_orm::DatabaseConnection;

/// Creates a questionnaire together with its ordered questions. Question order
/// follows the order of `prompts`.
pub async fn create(
    db: &DatabaseConnection,
    name: String,
    prompts: Vec<String>,
) -> Result<(questionnaires::Model, Vec<questions::Model>), Error> {
    let name = name.trim().to_owned();
    if name.is_empty() {
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(
                "questionnaire name must not be empty".to_string(),
            )),
        });
    }
    if prompts.is_empty() {
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(
                "a questionnaire needs at least one question".to_string(),
            )),
        });
    }
    if prompts.iter().any(|prompt| prompt.trim().is_empty()) {
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(
                "question prompts must not be empty".to_string(),
            )),
        });
    }

    // id and timestamps are assigned by the entity layer on insert
    let now = chrono::Utc::now();
    let questionnaire_model = questionnaire::create(
        db,
        questionnaires::Model {
            id: Id::default(),
            name,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    let mut question_models = Vec::with_capacity(prompts.len());
    for (position, prompt) in prompts.into_iter().enumerate() {
        let question_model = question::create(
            db,
            questions::Model {
                id: Id::default(),
                questionnaire_id: questionnaire_model.id,
                position: position as i32,
                prompt: prompt.trim().to_owned(),
                created_at: now.into(),
                updated_at: now.into(),
            },
        )
        .await?;
        question_models.push(question_model);
    }

    info!(
        "Created questionnaire \"{}\" with {} question(s)",
        questionnaire_model.name,
        question_models.len()
    );

    Ok((questionnaire_model, question_models))
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<questionnaires::Model, Error> {
    Ok(questionnaire::find_by_id(db, id).await?)
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<questionnaires::Model>, Error> {
    Ok(questionnaire::find_all(db).await?)
}

/// The questionnaire's questions in their native order.
pub async fn find_questions(
    db: &DatabaseConnection,
    questionnaire_id: Id,
) -> Result<Vec<questions::Model>, Error> {
    Ok(question::find_by_questionnaire_id(db, questionnaire_id).await?)
}
