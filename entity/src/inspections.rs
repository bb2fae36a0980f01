//! SeaORM Entity for inspections table.
//! One reviewed conversation instance tied to one questionnaire and one
//! submitting user. The workflow state is persisted here.

use crate::inspection_status::InspectionStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::inspections::Model)]
#[sea_orm(schema_name = "shopper_platform", table_name = "inspections")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub user_id: Id,

    #[schema(value_type = Uuid)]
    pub questionnaire_id: Id,

    /// Current state of the completion workflow
    pub status: InspectionStatus,

    /// Refined transcript of the recorded conversation
    #[sea_orm(column_type = "Text")]
    pub transcript: Option<String>,

    /// Set when the completion report has been generated, guarding the
    /// exactly-once report trigger
    #[schema(value_type = Option<String>, format = DateTime)]
    pub report_generated_at: Option<DateTimeWithTimeZone>,

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
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,

    #[sea_orm(
        belongs_to = "super::questionnaires::Entity",
        from = "Column::QuestionnaireId",
        to = "super::questionnaires::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Questionnaires,

    #[sea_orm(has_many = "super::answers::Entity")]
    Answers,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
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
