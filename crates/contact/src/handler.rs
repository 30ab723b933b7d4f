use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::{
    Addresses, CredentialSource, EmailProvider, ProviderError, Submission, SubmissionResult,
    compose, validation,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs one contact submission from validation to provider dispatch.
///
/// Every failure is folded into the returned [`SubmissionResult`]; nothing is
/// retried and no state is kept between calls.
#[derive(Clone)]
pub struct ContactHandler {
    provider: Arc<dyn EmailProvider>,
    credentials: Arc<dyn CredentialSource>,
    addresses: Addresses,
    timeout: Duration,
}

impl ContactHandler {
    pub fn new(provider: Arc<dyn EmailProvider>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            provider,
            credentials,
            addresses: Addresses::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_addresses(mut self, addresses: Addresses) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addresses(&self) -> &Addresses {
        &self.addresses
    }

    #[tracing::instrument(skip_all, fields(provider = self.provider.name()))]
    pub async fn submit(&self, submission: Submission) -> SubmissionResult {
        let result = match AssertUnwindSafe(self.process(submission))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                error!(detail = %detail, "Contact submission panicked");
                SubmissionResult::unknown_error(detail)
            }
        };

        info!(
            outcome = %result.outcome(),
            status = result.status_code(),
            message_id = result.message_id().unwrap_or_default(),
            "Contact submission finished"
        );

        result
    }

    async fn process(&self, submission: Submission) -> SubmissionResult {
        let submission = submission.sanitized();

        if let Err(err) = validation::validate(&submission) {
            warn!(reason = %err, "Contact submission rejected");
            return SubmissionResult::validation_error(err.to_string());
        }

        let Some(credential) = self.credentials.load() else {
            error!("Email provider credential is not configured");
            return SubmissionResult::service_unavailable();
        };

        info!(
            credential_present = true,
            credential = %credential.masked(),
            "Email provider credential loaded"
        );

        let email = match compose(&submission, &self.addresses) {
            Ok(email) => email,
            Err(err) => {
                error!(error = %err, "Failed to render contact email");
                return SubmissionResult::unknown_error(err.to_string());
            }
        };

        info!(
            to = %email.to,
            from = %email.from,
            subject = %email.subject,
            "Dispatching contact email"
        );

        let sent = tokio::time::timeout(self.timeout, self.provider.send(&credential, &email))
            .await
            .unwrap_or(Err(ProviderError::Timeout(self.timeout)));

        match sent {
            Ok(message_id) => {
                info!(message_id = %message_id, "Contact email accepted by provider");
                SubmissionResult::success(message_id)
            }
            Err(err) => {
                error!(error = %err, "Email provider failed to send contact email");
                SubmissionResult::provider_error(err.to_string())
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_default()
}
