use crate::controller::ApiResponse;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{user as UserApi, users};

use log::*;

/// POST register a new User for a chat surface identifier
#[utoipa::path(
    post,
    path = "/users",
    request_body = users::Model,
    responses(
        (status = 201, description = "Successfully registered a User", body = [users::Model]),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(user_model): Json<users::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Register a new User from: {:?}", user_model);

    let user = UserApi::register(app_state.db_conn_ref(), user_model).await?;

    debug!("Registered User: {:?}", user);

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), user)))
}
