use crate::controller::ApiResponse;
use crate::params::questionnaire::CreateParams;
use crate::response::questionnaire::QuestionnaireWithQuestions;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{questionnaire as QuestionnaireApi, questionnaires};

use log::*;

/// GET all Questionnaires
#[utoipa::path(
    get,
    path = "/questionnaires",
    responses(
        (status = 200, description = "Successfully retrieved all Questionnaires", body = [questionnaires::Model]),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET all Questionnaires");

    let questionnaires = QuestionnaireApi::find_all(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        questionnaires,
    )))
}

/// POST create a new Questionnaire with its ordered questions
#[utoipa::path(
    post,
    path = "/questionnaires",
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a Questionnaire", body = QuestionnaireWithQuestions),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Questionnaire from: {:?}", params);

    let (questionnaire, questions) =
        QuestionnaireApi::create(app_state.db_conn_ref(), params.name, params.prompts).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::CREATED.into(),
        QuestionnaireWithQuestions::new(questionnaire, questions),
    )))
}
