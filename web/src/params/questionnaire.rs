use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /questionnaires`: a display name plus the ordered prompts.
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = questionnaire::CreateParams)]
pub(crate) struct CreateParams {
    pub(crate) name: String,
    /// Question prompts in their native order
    pub(crate) prompts: Vec<String>,
}
