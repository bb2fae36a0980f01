use crate::controller::ApiResponse;
use crate::params::inspection::{AnswerParams, AudioCreateParams, CreateParams, IndexParams};
use crate::response::inspection::{AnswerReceipt, GapList, InspectionSubmission};
use crate::{AppState, Error};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use domain::inspection_status::InspectionStatus;
use domain::report::TextRenderer;
use domain::{
    gaps as GapsApi, inspection as InspectionApi, inspections, report as ReportApi,
    transcript as TranscriptApi, workflow, Id,
};
use inspection_ai::traits::report::Renderer;
use inspection_ai::types::transcription::Config as TranscriptionConfig;

use log::*;

/// POST submit a transcribed call for inspection.
///
/// Creates the inspection and synchronously runs model extraction; the
/// response carries whatever gaps are left for the human reviewer.
#[utoipa::path(
    post,
    path = "/inspections",
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created an Inspection and ran extraction", body = InspectionSubmission),
        (status = 404, description = "User or Questionnaire not found"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST Create a new Inspection for user {} against questionnaire {}",
        params.user_id, params.questionnaire_id
    );

    let inspection = InspectionApi::create(
        app_state.db_conn_ref(),
        params.user_id,
        params.questionnaire_id,
        params.transcript,
    )
    .await?;

    let outcome = workflow::run_extraction(
        app_state.db_conn_ref(),
        app_state.completion_provider(),
        inspection.id,
    )
    .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::CREATED.into(),
        InspectionSubmission::from(outcome),
    )))
}

/// POST submit a recorded call for inspection.
///
/// Accepts the raw audio, transcribes it through the transcription provider,
/// then runs the same create-and-extract path as `POST /inspections`. A
/// transcription failure rejects the submission before anything is persisted.
#[utoipa::path(
    post,
    path = "/inspections/audio",
    request_body(content = AudioCreateParams, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Successfully created an Inspection from audio and ran extraction", body = InspectionSubmission),
        (status = 404, description = "User or Questionnaire not found"),
        (status = 422, description = "Unprocessable Entity (missing parts or failed transcription)"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create_from_audio(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, Error> {
    let mut user_id: Option<Id> = None;
    let mut questionnaire_id: Option<Id> = None;
    let mut language: Option<String> = None;
    let mut audio: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| invalid_body(format!("malformed multipart body: {err}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("user_id") => user_id = Some(uuid_field(field, "user_id").await?),
            Some("questionnaire_id") => {
                questionnaire_id = Some(uuid_field(field, "questionnaire_id").await?)
            }
            Some("language") => {
                let value = text_field(field, "language").await?;
                if !value.trim().is_empty() {
                    language = Some(value.trim().to_owned());
                }
            }
            Some("audio") => {
                file_name = field.file_name().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| invalid_body(format!("unreadable audio part: {err}")))?;
                audio = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let user_id = user_id.ok_or_else(|| invalid_body("user_id part is required".to_owned()))?;
    let questionnaire_id = questionnaire_id
        .ok_or_else(|| invalid_body("questionnaire_id part is required".to_owned()))?;
    let audio = audio.ok_or_else(|| invalid_body("audio part is required".to_owned()))?;
    if audio.is_empty() {
        return Err(invalid_body("audio part must not be empty".to_owned()));
    }

    debug!(
        "POST Create a new Inspection from {} byte(s) of audio for user {user_id} \
         against questionnaire {questionnaire_id}",
        audio.len()
    );

    let transcript = TranscriptApi::transcribe_call(
        app_state.transcription_provider(),
        audio,
        TranscriptionConfig {
            language,
            file_name,
        },
    )
    .await?;

    let inspection = InspectionApi::create(
        app_state.db_conn_ref(),
        user_id,
        questionnaire_id,
        transcript,
    )
    .await?;

    let outcome = workflow::run_extraction(
        app_state.db_conn_ref(),
        app_state.completion_provider(),
        inspection.id,
    )
    .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::CREATED.into(),
        InspectionSubmission::from(outcome),
    )))
}

/// GET all Inspections, optionally filtered by submitter
#[utoipa::path(
    get,
    path = "/inspections",
    params(
        ("user_id" = Option<Uuid>, Query, description = "Filter by user_id")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Inspections", body = [inspections::Model]),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Inspections");
    debug!("Filter Params: {:?}", params);

    let inspections = InspectionApi::find_by(app_state.db_conn_ref(), params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), inspections)))
}

/// GET a single Inspection
#[utoipa::path(
    get,
    path = "/inspections/{id}",
    params(
        ("id" = Uuid, Path, description = "Inspection ID to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the Inspection", body = [inspections::Model]),
        (status = 404, description = "Inspection not found"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Inspection by id: {id}");

    let inspection = InspectionApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), inspection)))
}

/// GET the numbered gap list of an Inspection
#[utoipa::path(
    get,
    path = "/inspections/{id}/gaps",
    params(
        ("id" = Uuid, Path, description = "Inspection ID to list gaps for")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the gap list", body = GapList),
        (status = 404, description = "Inspection not found"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn gaps(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET gaps for Inspection: {id}");

    let inspection = InspectionApi::find_by_id(app_state.db_conn_ref(), id).await?;
    let gaps = GapsApi::find_gaps(app_state.db_conn_ref(), &inspection).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        GapList::new(inspection.id, gaps),
    )))
}

/// POST record one human answer against the current gap list
#[utoipa::path(
    post,
    path = "/inspections/{id}/answers",
    params(
        ("id" = Uuid, Path, description = "Inspection ID to record an answer for")
    ),
    request_body = AnswerParams,
    responses(
        (status = 200, description = "Successfully recorded the answer", body = AnswerReceipt),
        (status = 404, description = "Inspection not found"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn answers(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<AnswerParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST answer for Inspection {id}, gap index {}",
        params.index
    );

    let outcome = workflow::submit_answer(
        app_state.db_conn_ref(),
        app_state.inspection_locks(),
        id,
        params.index,
        &params.text,
    )
    .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        AnswerReceipt::from(outcome),
    )))
}

/// GET the rendered report document of a completed Inspection
#[utoipa::path(
    get,
    path = "/inspections/{id}/report",
    params(
        ("id" = Uuid, Path, description = "Inspection ID to render the report for")
    ),
    responses(
        (status = 200, description = "Rendered report document", body = String),
        (status = 404, description = "Inspection not found"),
        (status = 422, description = "Inspection is not complete"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn report(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET report for Inspection: {id}");

    let inspection = InspectionApi::find_by_id(app_state.db_conn_ref(), id).await?;
    if inspection.status != InspectionStatus::Complete {
        return Err(domain::error::Error {
            source: None,
            error_kind: domain::error::DomainErrorKind::Internal(
                domain::error::InternalErrorKind::Validation(format!(
                    "inspection {id} is not complete (status: {})",
                    inspection.status
                )),
            ),
        }
        .into());
    }

    let report = ReportApi::build_report(app_state.db_conn_ref(), &inspection).await?;
    let renderer = TextRenderer;
    let document = ReportApi::render_report(&renderer, &report)?;

    let headers = [
        (header::CONTENT_TYPE, renderer.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"inspection-{id}.{}\"",
                renderer.file_extension()
            ),
        ),
    ];

    Ok((StatusCode::OK, headers, document))
}

fn invalid_body(message: String) -> Error {
    domain::error::Error {
        source: None,
        error_kind: domain::error::DomainErrorKind::Internal(
            domain::error::InternalErrorKind::Validation(message),
        ),
    }
    .into()
}

async fn text_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, Error> {
    field
        .text()
        .await
        .map_err(|err| invalid_body(format!("unreadable {name} part: {err}")))
}

async fn uuid_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<Id, Error> {
    let text = text_field(field, name).await?;
    Id::parse_str(text.trim())
        .map_err(|_| invalid_body(format!("{name} part is not a valid UUID: {text:?}")))
}
