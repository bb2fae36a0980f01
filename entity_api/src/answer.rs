//! CRUD operations for answers table — the response ledger.
//!
//! At most one row exists per (inspection, question) pair; `upsert` replaces
//! the stored value rather than inserting a duplicate, so the last writer for
//! a given pair wins.

use super::error::Error;
use entity::answers::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

/// Inserts or overwrites the single answer row for the given
/// (inspection, question) pair. `None` stores the "no answer yet" sentinel.
pub async fn upsert(
    db: &DatabaseConnection,
    inspection_id: Id,
    question_id: Id,
    answer_text: Option<String>,
) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    let existing = find_by_inspection_and_question(db, inspection_id, question_id).await?;

    match existing {
        Some(answer) => {
            debug!("Overwriting answer for inspection {inspection_id}, question {question_id}");

            let active_model = ActiveModel {
                id: Unchanged(answer.id),
                inspection_id: Unchanged(answer.inspection_id),
                question_id: Unchanged(answer.question_id),
                answer_text: Set(answer_text),
                created_at: Unchanged(answer.created_at),
                updated_at: Set(now.into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("Inserting answer for inspection {inspection_id}, question {question_id}");

            let active_model = ActiveModel {
                inspection_id: Set(inspection_id),
                question_id: Set(question_id),
                answer_text: Set(answer_text),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };

            Ok(active_model.save(db).await?.try_into_model()?)
        }
    }
}

pub async fn find_by_inspection_and_question(
    db: &DatabaseConnection,
    inspection_id: Id,
    question_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::InspectionId.eq(inspection_id))
        .filter(Column::QuestionId.eq(question_id))
        .one(db)
        .await?)
}

/// Returns every answer row recorded for the inspection.
pub async fn find_all_by_inspection(
    db: &DatabaseConnection,
    inspection_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::InspectionId.eq(inspection_id))
        .all(db)
        .await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn answer(inspection_id: Id, question_id: Id, answer_text: Option<&str>) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            inspection_id,
            question_id,
            answer_text: answer_text.map(|text| text.to_owned()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn upsert_inserts_when_no_row_exists_for_the_pair() -> Result<(), Error> {
        let inspection_id = Id::new_v4();
        let question_id = Id::new_v4();
        let inserted = answer(inspection_id, question_id, Some("Да, поздоровался"));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // First query: lookup of the existing pair comes back empty
            .append_query_results(vec![Vec::<Model>::new()])
            // Second query: the row returned by the insert
            .append_query_results(vec![vec![inserted.clone()]])
            .into_connection();

        let result = upsert(
            &db,
            inspection_id,
            question_id,
            Some("Да, поздоровался".to_owned()),
        )
        .await?;

        assert_eq!(result.answer_text, inserted.answer_text);

        Ok(())
    }

    #[tokio::test]
    async fn upsert_overwrites_the_existing_row_for_the_pair() -> Result<(), Error> {
        let inspection_id = Id::new_v4();
        let question_id = Id::new_v4();
        let existing = answer(inspection_id, question_id, Some("первый вариант"));
        let mut overwritten = existing.clone();
        overwritten.answer_text = Some("второй вариант".to_owned());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing.clone()], vec![overwritten.clone()]])
            .into_connection();

        let result = upsert(
            &db,
            inspection_id,
            question_id,
            Some("второй вариант".to_owned()),
        )
        .await?;

        // Same row id, second write's value
        assert_eq!(result.id, existing.id);
        assert_eq!(result.answer_text.as_deref(), Some("второй вариант"));

        Ok(())
    }

    #[tokio::test]
    async fn find_all_by_inspection_returns_every_row() -> Result<(), Error> {
        let inspection_id = Id::new_v4();
        let first = answer(inspection_id, Id::new_v4(), Some("Да"));
        let second = answer(inspection_id, Id::new_v4(), None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![first.clone(), second.clone()]])
            .into_connection();

        let answers = find_all_by_inspection(&db, inspection_id).await?;

        assert_eq!(answers.len(), 2);
        assert_eq!(answers[1].answer_text, None);

        Ok(())
    }
}
