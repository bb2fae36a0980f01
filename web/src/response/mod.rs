pub(crate) mod inspection;
pub(crate) mod questionnaire;
