//! Inspection response DTOs.
//!
//! The workflow reports gaps as ordered question models; these DTOs number
//! them 1-based so clients can echo the index back through
//! `POST /inspections/{id}/answers`.

use domain::inspections::Model as InspectionModel;
use domain::questions::Model as QuestionModel;
use domain::workflow::{AnswerOutcome, ExtractionOutcome};
use domain::Id;
use serde::Serialize;
use utoipa::ToSchema;

/// One unanswered question, numbered for human intake
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Gap {
    /// 1-based index into the current gap list
    pub index: usize,
    #[schema(value_type = Uuid)]
    pub question_id: Id,
    pub prompt: String,
}

impl Gap {
    fn number(gaps: Vec<QuestionModel>) -> Vec<Self> {
        gaps.into_iter()
            .enumerate()
            .map(|(position, question)| Gap {
                index: position + 1,
                question_id: question.id,
                prompt: question.prompt,
            })
            .collect()
    }
}

/// Result of submitting a transcript: the created inspection plus whatever
/// the extraction left for the human reviewer
#[derive(Debug, Serialize, ToSchema)]
pub struct InspectionSubmission {
    #[serde(flatten)]
    pub inspection: InspectionModel,

    /// Unanswered questions in questionnaire order
    pub gaps: Vec<Gap>,

    /// Present when extraction failed and every question needs a manual answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<ExtractionOutcome> for InspectionSubmission {
    fn from(outcome: ExtractionOutcome) -> Self {
        Self {
            inspection: outcome.inspection,
            gaps: Gap::number(outcome.gaps),
            warning: outcome.warning,
        }
    }
}

/// Result of recording one human answer
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerReceipt {
    #[serde(flatten)]
    pub inspection: InspectionModel,

    /// Gaps still outstanding, renumbered
    pub remaining_gaps: Vec<Gap>,
}

impl From<AnswerOutcome> for AnswerReceipt {
    fn from(outcome: AnswerOutcome) -> Self {
        Self {
            inspection: outcome.inspection,
            remaining_gaps: Gap::number(outcome.remaining_gaps),
        }
    }
}

/// Current gap list of an inspection
#[derive(Debug, Serialize, ToSchema)]
pub struct GapList {
    #[schema(value_type = Uuid)]
    pub inspection_id: Id,
    pub gaps: Vec<Gap>,
}

impl GapList {
    pub fn new(inspection_id: Id, gaps: Vec<QuestionModel>) -> Self {
        Self {
            inspection_id,
            gaps: Gap::number(gaps),
        }
    }
}
