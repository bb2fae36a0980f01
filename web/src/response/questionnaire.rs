//! Questionnaire response DTOs.

use domain::questionnaires::Model as QuestionnaireModel;
use domain::questions::Model as QuestionModel;
use serde::Serialize;
use utoipa::ToSchema;

/// A questionnaire together with its ordered questions
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionnaireWithQuestions {
    #[serde(flatten)]
    pub questionnaire: QuestionnaireModel,

    /// Questions in their native order
    pub questions: Vec<QuestionModel>,
}

impl QuestionnaireWithQuestions {
    pub fn new(questionnaire: QuestionnaireModel, questions: Vec<QuestionModel>) -> Self {
        Self {
            questionnaire,
            questions,
        }
    }
}
