use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, response::IntoResponse, routing::get};
use muunoob_contact::{
    Addresses, ContactHandler, EmailProvider, EnvCredentials, RateLimiter,
    provider::{ResendProvider, SmtpProvider, SmtpSettings},
};

use crate::{
    config::{Config, ProviderKind},
    error::AppError,
};

mod contact;
mod health;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub contact: ContactHandler,
    pub limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    /// Builds the state around an already configured handler.
    pub fn new(config: Config, contact: ContactHandler) -> Self {
        let limiter = config.contact.rate_limit_enabled.then(|| {
            Arc::new(RateLimiter::new(
                config.contact.rate_limit_window(),
                config.contact.rate_limit_max,
            ))
        });

        Self {
            config,
            contact,
            limiter,
        }
    }

    pub fn from_config(config: Config) -> Self {
        let email = &config.email;

        let provider: Arc<dyn EmailProvider> = match email.provider {
            ProviderKind::Resend => Arc::new(ResendProvider::new(email.api_url.to_owned())),
            ProviderKind::Smtp => Arc::new(SmtpProvider::new(SmtpSettings {
                host: email.smtp.host.to_owned(),
                port: email.smtp.port,
                username: email.smtp.username.to_owned(),
                security: email.smtp.security,
                timeout: email.timeout(),
            })),
        };

        let contact = ContactHandler::new(
            provider,
            Arc::new(EnvCredentials::new(email.api_key_var.to_owned())),
        )
        .with_addresses(Addresses {
            from: email.from.to_owned(),
            to: email.to.to_owned(),
            site: email.site.to_owned(),
        })
        .with_timeout(email.timeout());

        Self::new(config, contact)
    }
}

pub async fn fallback() -> impl IntoResponse {
    AppError::NotFound
}

pub fn router(app_state: AppState) -> Router {
    let max_body_bytes = app_state.config.contact.max_body_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route("/api/contact", get(contact::token).post(contact::action))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(app_state)
}
