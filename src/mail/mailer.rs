//! Mailer trait and SMTP implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as AttachmentPart, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;

use super::{Email, MailError};

/// Async email sending trait.
///
/// Implement this trait to provide alternative relay backends or to record
/// dispatches in tests.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send an email.
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    /// SMTP server hostname.
    #[serde(rename = "smtp_host")]
    pub host: String,

    /// SMTP server port (default: 587).
    #[serde(rename = "smtp_port", default = "default_port")]
    pub port: u16,

    /// SMTP username for authentication.
    #[serde(rename = "smtp_username")]
    pub username: Option<String>,

    /// SMTP password for authentication.
    #[serde(rename = "smtp_password")]
    pub password: Option<String>,

    /// Sender address.
    #[serde(rename = "smtp_from")]
    pub from: String,

    /// TLS mode: "starttls" (default), "tls", or "none".
    #[serde(rename = "smtp_tls", default = "default_tls")]
    pub tls: String,

    /// Connection timeout in seconds (default: 10).
    #[serde(rename = "smtp_timeout", default = "default_timeout")]
    pub timeout: u64,
}

fn default_port() -> u16 {
    587
}

fn default_tls() -> String {
    "starttls".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// SMTP-based mailer using lettre.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a mailer from environment variables.
    ///
    /// Reads `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`,
    /// `SMTP_FROM`, `SMTP_TLS`, `SMTP_TIMEOUT`.
    pub fn from_env() -> Result<Self, MailError> {
        dotenvy::dotenv().ok();

        let config: MailerConfig =
            serde_env::from_env().map_err(|e| MailError::MissingConfig(e.to_string()))?;

        Self::from_config(config)
    }

    /// Create a mailer from explicit configuration.
    pub fn from_config(config: MailerConfig) -> Result<Self, MailError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| MailError::InvalidAddress(config.from.clone()))?;

        let mut builder = match config.tls.as_str() {
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
        };

        builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout)));

        if let (Some(username), Some(password)) = (config.username, config.password) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        let transport = builder.build();

        Ok(Self {
            transport: Arc::new(transport),
            from,
        })
    }

    /// Build a lettre Message from our Email type.
    fn build_message(&self, email: &Email) -> Result<Message, MailError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| MailError::InvalidAddress(email.to.clone()))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject);

        if email.attachments.is_empty() {
            return builder
                .body(email.body.clone())
                .map_err(|e| MailError::Build(e.to_string()));
        }

        let octet_stream = ContentType::parse("application/octet-stream")
            .map_err(|e| MailError::Build(e.to_string()))?;

        let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(email.body.clone()));
        for attachment in &email.attachments {
            multipart = multipart.singlepart(
                AttachmentPart::new(attachment.filename.clone())
                    .body(Body::new(attachment.content.clone()), octet_stream.clone()),
            );
        }

        builder
            .multipart(multipart)
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let message = self.build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        Ok(())
    }
}
