use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use muunoob_contact::RateLimited;
use serde_json::json;
use thiserror::Error;

/// Rejections raised by the HTTP layer before a submission reaches the handler.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Too many requests. Please try again later.")]
    RateLimited(#[from] RateLimited),

    #[error("Invalid content type")]
    InvalidContentType,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Invalid or expired form token. Please refresh the page and try again.")]
    InvalidFormToken,

    #[error("Not found")]
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));

        match self {
            AppError::RateLimited(limited) => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, limited.retry_after_secs().to_string())],
                body,
            )
                .into_response(),
            AppError::InvalidContentType => (StatusCode::BAD_REQUEST, body).into_response(),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, body).into_response(),
            AppError::InvalidFormToken => (StatusCode::FORBIDDEN, body).into_response(),
            AppError::NotFound => (StatusCode::NOT_FOUND, body).into_response(),
        }
    }
}
