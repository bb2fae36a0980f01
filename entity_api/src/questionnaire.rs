//! CRUD operations for questionnaires table.
//!
//! Questionnaires are read-only during inspections; `create` exists for
//! seeding and administrative setup.

use super::error::{EntityApiErrorKind, Error};
use entity::questionnaires::{ActiveModel, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection, TryIntoModel};

pub async fn create(db: &DatabaseConnection, questionnaire_model: Model) -> Result<Model, Error> {
    debug!("New Questionnaire Model to be inserted: {questionnaire_model:?}");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        name: Set(questionnaire_model.name),
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

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().all(db).await?)
}
