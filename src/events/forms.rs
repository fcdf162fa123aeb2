use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;

/// The event create/update form. The checkbox arrives as `is_active=on`
/// when ticked and is absent otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct EventForm {
    pub description: String,
    pub begin_at: NaiveDate,
    pub end_at: NaiveDate,
    pub max_users: i32,
    #[serde(default)]
    pub is_active: Option<String>,
}

impl EventForm {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.description.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Description is required".to_string(),
            ));
        }
        if self.max_users < 1 {
            return Err(AppError::ValidationError(
                "Max users must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active.is_some()
    }
}
