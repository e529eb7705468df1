use lazy_static::lazy_static;
use regex::Regex;

use crate::error::HttpError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Missing and empty are the same thing on this wire. The whole required set
/// is checked in one pass, before any handler logic runs.
pub fn require_filled(fields: &[&str]) -> Result<(), HttpError> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(HttpError::Validation("Please Fill Full Form!".into()));
    }
    Ok(())
}

pub fn require_valid_email(email: &str) -> Result<(), HttpError> {
    if !is_valid_email(email) {
        return Err(HttpError::Validation("Please Provide A Valid Email!".into()));
    }
    Ok(())
}

/// Optional form fields arrive as empty strings; store them as NULL.
pub fn none_if_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
