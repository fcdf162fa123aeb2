//! Database module: row types and the data access layer.

pub mod models;
pub mod operations;

pub use models::{Event, EventRegistration, EventUser, User, UserSession};
pub use operations::DbOperations;
