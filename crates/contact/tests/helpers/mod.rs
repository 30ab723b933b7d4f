#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use muunoob_contact::{
    ContactHandler, Credential, EmailProvider, OutboundEmail, ProviderError, StaticCredentials,
    Submission,
};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub enum Behavior {
    /// Hands out `<prefix>-1`, `<prefix>-2`, ...
    Succeed(&'static str),
    Fail(&'static str),
    Hang(Duration),
    Panic,
}

/// Provider double that records every message it is asked to send.
pub struct RecordingProvider {
    behavior: Behavior,
    sent: Mutex<Vec<(String, OutboundEmail)>>,
}

impl RecordingProvider {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|(_, email)| email.clone())
            .collect()
    }

    pub async fn credentials_used(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|(credential, _)| credential.clone())
            .collect()
    }
}

#[async_trait]
impl EmailProvider for RecordingProvider {
    async fn send(
        &self,
        credential: &Credential,
        email: &OutboundEmail,
    ) -> Result<String, ProviderError> {
        let count = {
            let mut sent = self.sent.lock().await;
            sent.push((credential.expose().to_owned(), email.clone()));
            sent.len()
        };

        match &self.behavior {
            Behavior::Succeed(prefix) => Ok(format!("{prefix}-{count}")),
            Behavior::Fail(message) => Err(ProviderError::Rejected {
                status: 429,
                message: (*message).to_owned(),
            }),
            Behavior::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                Ok("too-late".to_owned())
            }
            Behavior::Panic => panic!("provider exploded"),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub fn handler(provider: Arc<RecordingProvider>) -> ContactHandler {
    ContactHandler::new(provider, Arc::new(StaticCredentials::new("re_test_123456789")))
}

pub fn unconfigured_handler(provider: Arc<RecordingProvider>) -> ContactHandler {
    ContactHandler::new(provider, Arc::new(StaticCredentials::missing()))
}

pub fn jane() -> Submission {
    Submission::new(
        "Jane Doe",
        "jane@example.com",
        "Pricing",
        "What are your rates?",
    )
}
