//! Types for inspection report rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One question/answer pair in a finished report, in questionnaire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Free-text question prompt
    pub prompt: String,
    /// The recorded answer. A report is only assembled once every question
    /// has a non-sentinel answer, so this is never empty in practice.
    pub answer: String,
}

/// A fully-answered inspection, assembled from the answer ledger and handed
/// to a [`crate::traits::report::Renderer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionReport {
    /// Inspection identifier, rendered into the document header
    pub inspection_id: String,
    /// Display name of the questionnaire the inspection was graded against
    pub questionnaire_name: String,
    /// Question/answer pairs in the questionnaire's native order
    pub entries: Vec<ReportEntry>,
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_preserves_entry_order() {
        let report = InspectionReport {
            inspection_id: "7e1de1a6-4a88-43bb-9f27-0dd8bbb5c2c3".to_owned(),
            questionnaire_name: "Store visit call review".to_owned(),
            entries: vec![
                ReportEntry {
                    prompt: "Поздоровался ли продавец?".to_owned(),
                    answer: "Да, говорит здравствуйте".to_owned(),
                },
                ReportEntry {
                    prompt: "Был ли продавец вежлив?".to_owned(),
                    answer: "Вежлив".to_owned(),
                },
            ],
            generated_at: Utc::now(),
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: InspectionReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.entries, report.entries);
    }
}
