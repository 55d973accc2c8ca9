//! Email delivery over SMTP

use crate::config::{Credentials, MailSettings};
use crate::error::MailError;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials as SmtpCredentials,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

/// An HTML email; sender and recipient come from the mailer's configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
}

impl EmailMessage {
    pub fn new(subject: impl Into<String>, html_body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// [`Mailer`] that opens a fresh implicit-TLS SMTP session per message
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    receiver: String,
}

impl SmtpMailer {
    /// The SMTP login doubles as the sender address
    pub fn new(credentials: &Credentials, settings: &MailSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            username: credentials.email_user.clone(),
            password: credentials.email_password.clone(),
            receiver: credentials.email_receiver.clone(),
        }
    }

    /// Validate addresses and assemble the MIME message
    fn build_message(&self, message: &EmailMessage) -> Result<Message, MailError> {
        let from = parse_mailbox(&self.username)?;
        let to = parse_mailbox(&self.receiver)?;

        Ok(Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())?)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse()
        .map_err(|source| MailError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let email = self.build_message(message)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)?
            .port(self.port)
            .credentials(SmtpCredentials::new(
                self.username.clone(),
                self.password.expose_secret().to_string(),
            ))
            .build();

        debug!(host = %self.host, port = self.port, subject = %message.subject, "Sending email");
        transport.send(email).await?;

        info!("Email sent to {}", self.receiver);
        Ok(())
    }
}
