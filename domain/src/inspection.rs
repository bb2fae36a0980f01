//! Inspections as seen by the domain layer.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::{inspections, Id, IntoQueryFilterMap};
use entity_api::{inspection, query, user};
use sea_orm::DatabaseConnection;

/// Creates a new inspection for a submitted call transcript. The referenced
/// user and questionnaire must exist; the transcript must be non-blank.
pub async fn create(
    db: &DatabaseConnection,
    user_id: Id,
    questionnaire_id: Id,
    transcript: String,
) -> Result<inspections::Model, Error> {
    let transcript = transcript.trim().to_owned();
    if transcript.is_empty() {
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(
                "transcript must not be empty".to_string(),
            )),
        });
    }

    // Surface a NotFound for dangling references before hitting FK errors
    user::find_by_id(db, user_id).await?;
    crate::questionnaire::find_by_id(db, questionnaire_id).await?;

    let now = chrono::Utc::now();
    let inspection_model = inspections::Model {
        id: Id::default(),
        user_id,
        questionnaire_id,
        status: crate::inspection_status::InspectionStatus::Transcribed,
        transcript: Some(transcript),
        report_generated_at: None,
        created_at: now.into(),
        updated_at: now.into(),
    };

    Ok(inspection::create(db, inspection_model).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<inspections::Model, Error> {
    Ok(inspection::find_by_id(db, id).await?)
}

pub async fn find_by(
    db: &DatabaseConnection,
    params: impl IntoQueryFilterMap,
) -> Result<Vec<inspections::Model>, Error> {
    let inspections = query::find_by::<inspections::Entity, inspections::Column>(
        db,
        params.into_query_filter_map(),
        inspections::Column::CreatedAt,
    )
    .await?;

    Ok(inspections)
}
