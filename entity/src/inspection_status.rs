use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Workflow state of an inspection, persisted so that an in-progress
/// gap-filling session survives a process restart.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "inspection_status")]
pub enum InspectionStatus {
    /// Transcript captured, extraction has not run yet
    #[sea_orm(string_value = "transcribed")]
    #[default]
    Transcribed,
    /// The completion model is being queried for candidate answers
    #[sea_orm(string_value = "extracting")]
    Extracting,
    /// Waiting for a human to fill the remaining gaps
    #[sea_orm(string_value = "awaiting_human")]
    AwaitingHuman,
    /// Every question has a non-sentinel answer
    #[sea_orm(string_value = "complete")]
    Complete,
}

impl std::fmt::Display for InspectionStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InspectionStatus::Transcribed => write!(fmt, "transcribed"),
            InspectionStatus::Extracting => write!(fmt, "extracting"),
            InspectionStatus::AwaitingHuman => write!(fmt, "awaiting_human"),
            InspectionStatus::Complete => write!(fmt, "complete"),
        }
    }
}
