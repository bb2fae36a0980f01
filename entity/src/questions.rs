//! SeaORM Entity for questions table.
//! A question belongs to exactly one questionnaire; `position` defines the
//! questionnaire's native question order.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::questions::Model)]
#[sea_orm(schema_name = "shopper_platform", table_name = "questions")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub questionnaire_id: Id,

    /// Zero-based order of the question within its questionnaire
    pub position: i32,

    /// Free-text prompt shown to the model and to the human reviewer
    #[sea_orm(column_type = "Text")]
    pub prompt: String,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::questionnaires::Entity",
        from = "Column::QuestionnaireId",
        to = "super::questionnaires::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Questionnaires,

    #[sea_orm(has_many = "super::answers::Entity")]
    Answers,
}

impl Related<super::questionnaires::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questionnaires.def()
    }
}

impl Related<super::answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
