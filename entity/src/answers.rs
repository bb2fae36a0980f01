//! SeaORM Entity for answers table.
//! The response ledger: at most one row per (inspection, question) pair,
//! enforced by a uniqueness constraint. `answer_text = NULL` is the
//! "no answer yet" sentinel.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::answers::Model)]
#[sea_orm(schema_name = "shopper_platform", table_name = "answers")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub inspection_id: Id,

    #[schema(value_type = Uuid)]
    pub question_id: Id,

    /// Extracted or human-supplied answer; NULL means "no answer yet"
    #[sea_orm(column_type = "Text", nullable)]
    pub answer_text: Option<String>,

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
        belongs_to = "super::inspections::Entity",
        from = "Column::InspectionId",
        to = "super::inspections::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Inspections,

    #[sea_orm(
        belongs_to = "super::questions::Entity",
        from = "Column::QuestionId",
        to = "super::questions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Questions,
}

impl Related<super::inspections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inspections.def()
    }
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
