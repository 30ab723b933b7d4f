use std::net::SocketAddr;

use axum::{
    Json,
    body::Bytes,
    extract::{ConnectInfo, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use muunoob_contact::{ContactRequest, SUCCESS_MESSAGE, SubmissionResult, token};
use serde_json::json;

use crate::{error::AppError, routes::AppState};

/// GET /api/contact - hands out a fresh form token
pub async fn token() -> impl IntoResponse {
    Json(json!({ "csrfToken": token::issue() }))
}

/// POST /api/contact
pub async fn action(
    State(app_state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let ip = client_ip(
        &headers,
        peer,
        app_state.config.contact.trust_proxy_headers,
    );

    if let Some(limiter) = &app_state.limiter {
        if let Err(limited) = limiter.check(&ip).await {
            tracing::warn!(ip = %ip, retry_after = limited.retry_after_secs(), "Contact form rate limited");
            return Err(limited.into());
        }
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    if !is_json {
        return Err(AppError::InvalidContentType);
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(AppError::PayloadTooLarge);
        }
        Err(rejection) => {
            return Ok(submission_response(SubmissionResult::unknown_error(
                rejection.body_text(),
            )));
        }
    };

    if body.len() > app_state.config.contact.max_body_bytes {
        return Err(AppError::PayloadTooLarge);
    }

    let request = match ContactRequest::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(ip = %ip, error = %e, "Malformed contact request body");
            return Ok(submission_response(SubmissionResult::unknown_error(
                e.to_string(),
            )));
        }
    };

    if app_state.config.contact.require_form_token
        && !token::verify(
            request.csrf_token.as_deref(),
            app_state.config.contact.form_token_max_age(),
        )
    {
        tracing::warn!(ip = %ip, "Contact form token rejected");
        return Err(AppError::InvalidFormToken);
    }

    if request.is_bot() {
        tracing::info!(ip = %ip, "Contact form honeypot triggered");
        return Ok((
            StatusCode::OK,
            Json(json!({ "success": true, "message": SUCCESS_MESSAGE })),
        )
            .into_response());
    }

    let result = app_state.contact.submit(request.submission).await;

    Ok(submission_response(result))
}

fn submission_response(result: SubmissionResult) -> Response {
    let status =
        StatusCode::from_u16(result.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(result.body())).into_response()
}

/// The peer address, unless proxy headers are trusted: then the first
/// `x-forwarded-for` hop, then `x-real-ip`, then the peer.
fn client_ip(headers: &HeaderMap, peer: SocketAddr, trust_proxy_headers: bool) -> String {
    if !trust_proxy_headers {
        return peer.ip().to_string();
    }

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(str::to_owned)
        .unwrap_or_else(|| peer.ip().to_string())
}
