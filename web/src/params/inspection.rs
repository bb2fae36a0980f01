use domain::Id;
use domain::{IntoQueryFilterMap, QueryFilterMap};
use sea_orm::Value;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    #[param(value_type = Option<Uuid>)]
    pub(crate) user_id: Option<Id>,
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        if let Some(user_id) = self.user_id {
            query_filter_map.insert(
                "user_id".to_string(),
                Some(Value::Uuid(Some(Box::new(user_id)))),
            );
        }
        query_filter_map
    }
}

/// Body of `POST /inspections`: a transcribed call to grade.
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = inspection::CreateParams)]
pub(crate) struct CreateParams {
    #[schema(value_type = Uuid)]
    pub(crate) user_id: Id,
    #[schema(value_type = Uuid)]
    pub(crate) questionnaire_id: Id,
    /// Raw transcript text of the recorded call
    pub(crate) transcript: String,
}

/// Multipart body of `POST /inspections/audio`: a recorded call to
/// transcribe and grade. Documentation-only; the handler reads the parts
/// directly from the multipart stream.
#[allow(dead_code)]
#[derive(Debug, ToSchema)]
#[schema(as = inspection::AudioCreateParams)]
pub(crate) struct AudioCreateParams {
    #[schema(value_type = Uuid)]
    pub(crate) user_id: Id,
    #[schema(value_type = Uuid)]
    pub(crate) questionnaire_id: Id,
    /// ISO 639-1 language hint for the transcription engine
    pub(crate) language: Option<String>,
    /// The recorded call audio file
    #[schema(value_type = String, format = Binary)]
    pub(crate) audio: Vec<u8>,
}

/// Body of `POST /inspections/{id}/answers`: one human answer for a gap.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct AnswerParams {
    /// 1-based index into the current gap list
    pub(crate) index: usize,
    pub(crate) text: String,
}
