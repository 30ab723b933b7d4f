use serde::Serialize;
use serde_json::{Value, json};

pub const SUCCESS_MESSAGE: &str = "Message sent successfully";
pub const NOT_CONFIGURED: &str = "Email service not configured.";
pub const UNKNOWN_FALLBACK: &str = "Unexpected error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum Outcome {
    Success,
    ValidationError,
    ServiceUnavailable,
    ProviderError,
    UnknownError,
}

impl Outcome {
    pub fn status_code(self) -> u16 {
        match self {
            Outcome::Success => 200,
            Outcome::ValidationError => 400,
            Outcome::ServiceUnavailable | Outcome::ProviderError | Outcome::UnknownError => 500,
        }
    }
}

/// Result of one submission. Built only through the per-outcome constructors so
/// that `message_id` is set exactly when the outcome is a success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    outcome: Outcome,
    message_id: Option<String>,
    detail: Option<String>,
}

impl SubmissionResult {
    pub fn success(message_id: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            message_id: Some(message_id.into()),
            detail: None,
        }
    }

    pub fn validation_error(detail: impl Into<String>) -> Self {
        Self::failure(Outcome::ValidationError, detail.into())
    }

    pub fn service_unavailable() -> Self {
        Self::failure(Outcome::ServiceUnavailable, NOT_CONFIGURED.to_owned())
    }

    pub fn provider_error(detail: impl Into<String>) -> Self {
        Self::failure(Outcome::ProviderError, detail.into())
    }

    pub fn unknown_error(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if detail.trim().is_empty() {
            return Self::failure(Outcome::UnknownError, UNKNOWN_FALLBACK.to_owned());
        }

        Self::failure(Outcome::UnknownError, detail)
    }

    fn failure(outcome: Outcome, detail: String) -> Self {
        Self {
            outcome,
            message_id: None,
            detail: Some(detail),
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn status_code(&self) -> u16 {
        self.outcome.status_code()
    }

    /// JSON payload returned to the browser.
    pub fn body(&self) -> Value {
        let detail = self.detail.as_deref().unwrap_or_default();

        match self.outcome {
            Outcome::Success => json!({
                "success": true,
                "message": SUCCESS_MESSAGE,
                "id": self.message_id,
            }),
            Outcome::ValidationError | Outcome::ServiceUnavailable => json!({ "error": detail }),
            Outcome::ProviderError => json!({
                "error": "Failed to send email",
                "details": detail,
            }),
            Outcome::UnknownError => json!({
                "error": "Failed to send message",
                "details": detail,
            }),
        }
    }
}
