//! Transactional email providers the contact handler can dispatch through.

use std::time::Duration;

use async_trait::async_trait;

use crate::{Credential, OutboundEmail};

#[cfg(feature = "resend")]
mod resend;
#[cfg(feature = "smtp")]
mod smtp;

#[cfg(feature = "resend")]
pub use resend::ResendProvider;
#[cfg(feature = "smtp")]
pub use smtp::{SmtpProvider, SmtpSecurity, SmtpSettings};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered and refused the message.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Email provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),
}

/// Delivers one message and returns the identifier assigned to it.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(
        &self,
        credential: &Credential,
        email: &OutboundEmail,
    ) -> Result<String, ProviderError>;

    fn name(&self) -> &'static str;
}
