//! CRUD operations for users table.

use super::error::{EntityApiErrorKind, Error};
use entity::users::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection, TryIntoModel};

pub async fn create(db: &DatabaseConnection, user_model: Model) -> Result<Model, Error> {
    debug!("New User Model to be inserted: {user_model:?}");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        chat_user_id: Set(user_model.chat_user_id),
        username: Set(user_model.username),
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

pub async fn find_by_chat_user_id(
    db: &DatabaseConnection,
    chat_user_id: i64,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::ChatUserId.eq(chat_user_id))
        .one(db)
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

    #[tokio::test]
    async fn create_returns_a_new_user_model() -> Result<(), Error> {
        let now = chrono::Utc::now();

        let user_model = Model {
            id: Id::new_v4(),
            chat_user_id: 42,
            username: Some("demo_shopper".to_owned()),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_model.clone()]])
            .into_connection();

        let user = create(&db, user_model.clone()).await?;

        assert_eq!(user.chat_user_id, user_model.chat_user_id);

        Ok(())
    }
}
