use crate::{controller::health_check_controller, params, response, AppState};
use axum::{
    routing::{get, post},
    Router,
};

use crate::controller::{inspection_controller, questionnaire_controller, user_controller};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Shopper Platform API"
        ),
        paths(
            health_check_controller::health_check,
            user_controller::create,
            questionnaire_controller::index,
            questionnaire_controller::create,
            inspection_controller::create,
            inspection_controller::create_from_audio,
            inspection_controller::index,
            inspection_controller::read,
            inspection_controller::gaps,
            inspection_controller::answers,
            inspection_controller::report,
        ),
        components(
            schemas(
                domain::users::Model,
                domain::questionnaires::Model,
                domain::questions::Model,
                domain::inspections::Model,
                domain::inspection_status::InspectionStatus,
                params::questionnaire::CreateParams,
                params::inspection::CreateParams,
                params::inspection::AudioCreateParams,
                params::inspection::AnswerParams,
                response::questionnaire::QuestionnaireWithQuestions,
                response::inspection::Gap,
                response::inspection::GapList,
                response::inspection::InspectionSubmission,
                response::inspection::AnswerReceipt,
            )
        ),
        tags(
            (name = "shopper_platform", description = "Secret-Shopper Inspection API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(user_routes(app_state.clone()))
        .merge(questionnaire_routes(app_state.clone()))
        .merge(inspection_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route(
        "/health_check",
        get(health_check_controller::health_check),
    )
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users", post(user_controller::create))
        .with_state(app_state)
}

fn questionnaire_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/questionnaires", get(questionnaire_controller::index))
        .route("/questionnaires", post(questionnaire_controller::create))
        .with_state(app_state)
}

fn inspection_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/inspections", post(inspection_controller::create))
        .route(
            "/inspections/audio",
            post(inspection_controller::create_from_audio),
        )
        .route("/inspections", get(inspection_controller::index))
        .route("/inspections/:id", get(inspection_controller::read))
        .route("/inspections/:id/gaps", get(inspection_controller::gaps))
        .route(
            "/inspections/:id/answers",
            post(inspection_controller::answers),
        )
        .route(
            "/inspections/:id/report",
            get(inspection_controller::report),
        )
        .with_state(app_state)
}
