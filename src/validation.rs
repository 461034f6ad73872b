//! Request validation for create payloads.

use crate::error::AppError;
use regex::Regex;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

pub struct RequestValidator;

impl RequestValidator {
    /// Every listed field must be present and not blank.
    pub fn required(fields: &[(&str, &str)]) -> Result<(), AppError> {
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AppError::BadRequest(format!("{} is required", name)));
            }
        }
        Ok(())
    }

    /// Optional e-mail: absent is fine, present must look like `local@domain.tld`.
    pub fn email(col: &str, value: Option<&str>) -> Result<(), AppError> {
        let Some(v) = value else { return Ok(()) };
        let invalid = || AppError::BadRequest(format!("{} must be a valid email", col));
        let re = Regex::new(EMAIL_PATTERN).map_err(|_| invalid())?;
        if !re.is_match(v.trim()) {
            return Err(invalid());
        }
        Ok(())
    }
}
