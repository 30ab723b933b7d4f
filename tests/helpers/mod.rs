//! Test helpers for driving the router without a network listener.

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, connect_info::MockConnectInfo},
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use muunoob::{
    AppState, Config,
    config::{ContactConfig, EmailConfig, LoggingConfig, ServerConfig},
};
use muunoob_contact::{
    ContactHandler, Credential, CredentialSource, EmailProvider, OutboundEmail, ProviderError,
    StaticCredentials,
};
use tower::ServiceExt;

/// Provider double counting dispatches.
#[derive(Default)]
pub struct CountingProvider {
    calls: AtomicUsize,
    fail_with: Option<&'static str>,
}

impl CountingProvider {
    pub fn failing(message: &'static str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_with: Some(message),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailProvider for CountingProvider {
    async fn send(
        &self,
        _credential: &Credential,
        _email: &OutboundEmail,
    ) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        match self.fail_with {
            Some(message) => Err(ProviderError::Rejected {
                status: 422,
                message: message.to_owned(),
            }),
            None => Ok(format!("msg-{call}")),
        }
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Default config with rate limiting off so tests can send freely.
pub fn config() -> Config {
    let mut config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        email: EmailConfig::default(),
        contact: ContactConfig::default(),
        logging: LoggingConfig::default(),
    };
    config.contact.rate_limit_enabled = false;
    config
}

pub fn app_with(
    config: Config,
    provider: Arc<CountingProvider>,
    credentials: impl CredentialSource + 'static,
) -> Router {
    let handler = ContactHandler::new(provider, Arc::new(credentials));
    muunoob::router(AppState::new(config, handler)).layer(MockConnectInfo(default_peer()))
}

/// Peer address used when a request carries no `ConnectInfo` of its own.
pub fn default_peer() -> SocketAddr {
    SocketAddr::from(([192, 0, 2, 1], 50000))
}

/// Marks the request as coming from `ip`, like the listener does for real sockets.
pub fn from_peer(mut request: Request<Body>, ip: [u8; 4]) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 50000))));
    request
}

pub fn app(provider: Arc<CountingProvider>) -> Router {
    app_with(
        config(),
        provider,
        StaticCredentials::new("re_test_123456789"),
    )
}

pub fn json_request(body: impl Into<Body>) -> Request<Body> {
    Request::post("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

pub fn jane() -> serde_json::Value {
    serde_json::json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "subject": "Pricing",
        "message": "What are your rates?",
    })
}

pub async fn send(app: &Router, request: Request<Body>) -> (Response<()>, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    (Response::from_parts(parts, ()), json)
}
