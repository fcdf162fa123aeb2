use serde::Deserialize;

use crate::error::AppError;

/// The user registration form. Every field is required.
#[derive(Debug, Clone, Deserialize)]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

impl UserForm {
    pub fn validate(&self) -> Result<(), AppError> {
        for (value, label) in [
            (&self.first_name, "First name"),
            (&self.last_name, "Last name"),
            (&self.username, "Username"),
            (&self.password, "Password"),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::ValidationError(format!("{} is required", label)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> UserForm {
        UserForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            username: "ada".to_string(),
            password: "password123".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_every_field_required() {
        let mut form = valid_form();
        form.first_name = String::new();
        assert!(form.validate().is_err());

        let mut form = valid_form();
        form.password = "  ".to_string();
        assert!(form.validate().is_err());
    }
}
