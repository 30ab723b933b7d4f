use std::sync::LazyLock;

use regex::Regex;
use validator::Validate;

use crate::Submission;

/// Deliberately loose `local@domain.tld` shape.
static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

const FIELDS: [&str; 4] = ["name", "email", "subject", "message"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("All fields are required.")]
    MissingFields,

    #[error("Invalid email format.")]
    InvalidEmail,

    #[error("{0}")]
    Length(String),
}

pub fn is_valid_email(email: &str) -> bool {
    RE_EMAIL.is_match(email)
}

/// Runs the checks in order and reports the first one that fails.
pub fn validate(submission: &Submission) -> Result<(), ValidationError> {
    if !submission.has_all_fields() {
        return Err(ValidationError::MissingFields);
    }

    if !is_valid_email(&submission.email) {
        return Err(ValidationError::InvalidEmail);
    }

    let Err(errors) = submission.validate() else {
        return Ok(());
    };

    let field_errors = errors.field_errors();
    let message = FIELDS
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errors| errors.iter())
        .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string());

    Err(ValidationError::Length(message))
}
