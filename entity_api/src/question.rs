//! CRUD operations for questions table.

use super::error::{EntityApiErrorKind, Error};
use entity::questions::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, DatabaseConnection, QueryOrder, TryIntoModel,
};

pub async fn create(db: &DatabaseConnection, question_model: Model) -> Result<Model, Error> {
    debug!("New Question Model to be inserted: {question_model:?}");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        questionnaire_id: Set(question_model.questionnaire_id),
        position: Set(question_model.position),
        prompt: Set(question_model.prompt),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Returns the questionnaire's questions in their native order.
pub async fn find_by_questionnaire_id(
    db: &DatabaseConnection,
    questionnaire_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::QuestionnaireId.eq(questionnaire_id))
        .order_by_asc(Column::Position)
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

    fn question(questionnaire_id: Id, position: i32, prompt: &str) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            questionnaire_id,
            position,
            prompt: prompt.to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_by_questionnaire_id_returns_ordered_questions() -> Result<(), Error> {
        let questionnaire_id = Id::new_v4();
        let first = question(questionnaire_id, 0, "Поздоровался ли продавец?");
        let second = question(questionnaire_id, 1, "Был ли продавец вежлив?");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![first.clone(), second.clone()]])
            .into_connection();

        let questions = find_by_questionnaire_id(&db, questionnaire_id).await?;

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, first.id);
        assert_eq!(questions[1].id, second.id);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_not_found_for_unknown_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }
}
