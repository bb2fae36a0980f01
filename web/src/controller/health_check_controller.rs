use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET check that the API router is up
#[utoipa::path(
    get,
    path = "/health_check",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = String),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}
