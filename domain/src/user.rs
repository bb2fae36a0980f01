//! Users as seen by the domain layer.

use crate::error::Error;
use crate::{users, Id};
use entity_api::user;
use sea_orm::DatabaseConnection;

/// Registers a user for the given chat surface identifier. Registration is
/// idempotent: re-registering an existing `chat_user_id` returns the existing
/// record untouched.
pub async fn register(db: &DatabaseConnection, user_model: users::Model) -> Result<users::Model, Error> {
    if let Some(existing) = user::find_by_chat_user_id(db, user_model.chat_user_id).await? {
        return Ok(existing);
    }

    Ok(user::create(db, user_model).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<users::Model, Error> {
    Ok(user::find_by_id(db, id).await?)
}
