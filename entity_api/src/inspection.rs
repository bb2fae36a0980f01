//! CRUD operations for inspections table.
//!
//! The workflow state machine persists its current state through
//! `update_status`, and the exactly-once report trigger is implemented as a
//! conditional update on `report_generated_at`.

use super::error::{EntityApiErrorKind, Error};
use entity::inspection_status::InspectionStatus;
use entity::inspections::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    sea_query::Expr,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

pub async fn create(db: &DatabaseConnection, inspection_model: Model) -> Result<Model, Error> {
    debug!("New Inspection Model to be inserted: {inspection_model:?}");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        user_id: Set(inspection_model.user_id),
        questionnaire_id: Set(inspection_model.questionnaire_id),
        status: Set(InspectionStatus::Transcribed),
        transcript: Set(inspection_model.transcript),
        report_generated_at: Set(None),
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

/// Updates the persisted workflow state of an inspection.
pub async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: InspectionStatus,
) -> Result<Model, Error> {
    let result = Entity::find_by_id(id).one(db).await?;

    match result {
        Some(existing) => {
            debug!("Updating inspection status to {status}: {id}");

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                user_id: Unchanged(existing.user_id),
                questionnaire_id: Unchanged(existing.questionnaire_id),
                status: Set(status),
                transcript: Unchanged(existing.transcript),
                report_generated_at: Unchanged(existing.report_generated_at),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }),
    }
}

/// Stores the (refined) transcript on the inspection record.
pub async fn update_transcript(
    db: &DatabaseConnection,
    id: Id,
    transcript: String,
) -> Result<Model, Error> {
    let result = Entity::find_by_id(id).one(db).await?;

    match result {
        Some(existing) => {
            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                user_id: Unchanged(existing.user_id),
                questionnaire_id: Unchanged(existing.questionnaire_id),
                status: Unchanged(existing.status),
                transcript: Set(Some(transcript)),
                report_generated_at: Unchanged(existing.report_generated_at),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }),
    }
}

/// Stamps `report_generated_at` if and only if it has not been stamped before.
///
/// Returns `true` when this call won the stamp, `false` when the report was
/// already generated for the inspection. The conditional update makes the
/// completion report trigger fire exactly once even under concurrent
/// recomputation of gaps.
pub async fn mark_report_generated(db: &DatabaseConnection, id: Id) -> Result<bool, Error> {
    let now = chrono::Utc::now();

    let result = Entity::update_many()
        .col_expr(Column::ReportGeneratedAt, Expr::value(Some(now)))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .filter(Column::ReportGeneratedAt.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}
