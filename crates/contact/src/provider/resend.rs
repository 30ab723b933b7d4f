use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{EmailProvider, ProviderError};
use crate::{Credential, OutboundEmail};

pub const DEFAULT_API_URL: &str = "https://api.resend.com";

/// HTTP client for the Resend transactional email API.
#[derive(Debug, Clone)]
pub struct ResendProvider {
    client: reqwest::Client,
    api_url: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

impl ResendProvider {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }
}

impl Default for ResendProvider {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn send(
        &self,
        credential: &Credential,
        email: &OutboundEmail,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/emails", self.api_url.trim_end_matches('/'));
        let body = SendRequest {
            from: &email.from,
            to: [&email.to],
            reply_to: &email.reply_to,
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&raw)
                .map(|err| err.message)
                .unwrap_or_else(|_| format!("{}: {}", status.as_u16(), raw.trim()));

            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<SendResponse>(&raw)
            .map(|res| res.id)
            .map_err(|e| ProviderError::Transport(format!("Unexpected provider response: {e}")))
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}
