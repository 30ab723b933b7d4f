use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{AsyncSmtpTransportBuilder, authentication::Credentials},
};
use serde::Deserialize;
use tracing::info;
use ulid::Ulid;

use super::{EmailProvider, ProviderError};
use crate::{Credential, OutboundEmail};

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with `STARTTLS`, usually port 587.
    #[default]
    StartTls,
    /// TLS from the first byte, usually port 465.
    Tls,
    /// No encryption at all (local catchers like MailDev).
    None,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub security: SmtpSecurity,
    pub timeout: Duration,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 587,
            username: "noreply@muunoobstudios.com".to_owned(),
            security: SmtpSecurity::StartTls,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Sends through an SMTP relay. The credential is the SMTP password.
///
/// The send is a plain future, so dropping it (on timeout) aborts delivery.
#[derive(Debug, Clone)]
pub struct SmtpProvider {
    settings: SmtpSettings,
}

impl SmtpProvider {
    pub fn new(settings: SmtpSettings) -> Self {
        info!(
            smtp_host = %settings.host,
            smtp_port = settings.port,
            security = %settings.security,
            "SMTP email provider initialized"
        );

        Self { settings }
    }

    fn builder(&self) -> Result<AsyncSmtpTransportBuilder, ProviderError> {
        let host = &self.settings.host;
        let builder = match self.settings.security {
            SmtpSecurity::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host),
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host),
            SmtpSecurity::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)),
        };

        builder.map_err(|e| ProviderError::Transport(e.to_string()))
    }

    fn transport(
        &self,
        credential: &Credential,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, ProviderError> {
        let credentials = Credentials::new(
            self.settings.username.to_owned(),
            credential.expose().to_owned(),
        );

        Ok(self
            .builder()?
            .port(self.settings.port)
            .credentials(credentials)
            .timeout(Some(self.settings.timeout))
            .build())
    }
}

fn mailbox(value: &str) -> Result<Mailbox, ProviderError> {
    value
        .parse()
        .map_err(|e| ProviderError::Transport(format!("Invalid address {value}: {e}")))
}

/// Returns the message along with the `Message-ID` it was stamped with.
pub(crate) fn build_message(email: &OutboundEmail) -> Result<(Message, String), ProviderError> {
    let from = mailbox(&email.from)?;
    let message_id = format!("<{}@{}>", Ulid::new(), from.email.domain());

    let message = Message::builder()
        .message_id(Some(message_id.to_owned()))
        .from(from)
        .to(mailbox(&email.to)?)
        .reply_to(mailbox(&email.reply_to)?)
        .subject(email.subject.to_owned())
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.text.to_owned()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.html.to_owned()),
                ),
        )
        .map_err(|e| ProviderError::Transport(format!("Failed to build email message: {e}")))?;

    Ok((message, message_id))
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(
        &self,
        credential: &Credential,
        email: &OutboundEmail,
    ) -> Result<String, ProviderError> {
        let (message, message_id) = build_message(email)?;
        let mailer = self.transport(credential)?;

        mailer
            .send(message)
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(message_id)
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Greets like a relay and returns what the client sends first.
    async fn first_client_bytes(security: SmtpSecurity) -> (Vec<u8>, Result<String, ProviderError>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"220 localhost ESMTP\r\n").await.unwrap();

            let mut buf = vec![0; 64];
            let n = tokio::time::timeout(Duration::from_secs(5), socket.read(&mut buf))
                .await
                .unwrap()
                .unwrap();
            buf.truncate(n);
            buf
        };

        let provider = SmtpProvider::new(SmtpSettings {
            host: "localhost".to_owned(),
            port,
            security,
            timeout: Duration::from_secs(2),
            ..Default::default()
        });
        let credential = Credential::new("smtp-password");
        let email = outbound("jane@example.com");
        let client = provider.send(&credential, &email);

        tokio::join!(server, client)
    }

    #[tokio::test]
    async fn test_starttls_waits_for_greeting_and_speaks_smtp() {
        let (sent, result) = first_client_bytes(SmtpSecurity::StartTls).await;

        assert!(sent.starts_with(b"EHLO"), "got {sent:?}");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_implicit_tls_opens_with_client_hello() {
        let (sent, result) = first_client_bytes(SmtpSecurity::Tls).await;

        assert_eq!(sent.first(), Some(&0x16));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_security_is_starttls() {
        let settings = SmtpSettings::default();

        assert_eq!(settings.security, SmtpSecurity::StartTls);
        assert_eq!(settings.port, 587);
        assert_eq!(settings.security.to_string(), "starttls");
    }

    fn outbound(reply_to: &str) -> OutboundEmail {
        OutboundEmail {
            from: "Contact Form <noreply@muunoobstudios.com>".to_owned(),
            to: "business@muunoobstudios.com".to_owned(),
            reply_to: reply_to.to_owned(),
            subject: "[Contact Form] Pricing".to_owned(),
            html: "<p>What are your rates?</p>".to_owned(),
            text: "What are your rates?".to_owned(),
        }
    }

    #[test]
    fn test_build_message_headers() {
        let (message, message_id) = build_message(&outbound("jane@example.com")).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(message_id.starts_with('<'));
        assert!(message_id.ends_with("@muunoobstudios.com>"));
        assert!(raw.contains(&message_id));
        assert!(raw.contains("Reply-To: jane@example.com"));
        assert!(raw.contains("Subject: [Contact Form] Pricing"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn test_message_ids_are_unique() {
        let (_, first) = build_message(&outbound("jane@example.com")).unwrap();
        let (_, second) = build_message(&outbound("jane@example.com")).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_unparseable_reply_to_is_provider_error() {
        let err = build_message(&outbound("jane@@example.com")).unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
