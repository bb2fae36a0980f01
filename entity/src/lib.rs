use uuid::Uuid;

// Core entities
pub mod answers;
pub mod inspections;
pub mod questionnaires;
pub mod questions;
pub mod users;

pub mod inspection_status;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
