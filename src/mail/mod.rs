//! Email dispatch through an SMTP relay.
//!
//! A thin abstraction over [lettre](https://lettre.rs) with environment-based
//! configuration. The scheduler hands a fully-built [`Email`] to a [`Mailer`]
//! when a job's timer fires.
//!
//! # Environment Variables
//!
//! [`SmtpMailer::from_env`] reads:
//!
//! | Variable | Required | Description |
//! |----------|----------|-------------|
//! | `SMTP_HOST` | Yes | SMTP server hostname |
//! | `SMTP_PORT` | No | Port (default: 587) |
//! | `SMTP_USERNAME` | No | Username for authentication |
//! | `SMTP_PASSWORD` | No | Password for authentication |
//! | `SMTP_FROM` | Yes | Sender address |
//! | `SMTP_TLS` | No | `starttls` (default), `tls`, or `none` |
//! | `SMTP_TIMEOUT` | No | Connection timeout in seconds (default: 10) |

mod mailer;
mod message;

pub use mailer::{Mailer, MailerConfig, SmtpMailer};
pub use message::{Attachment, Email};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("missing required config: {0}")]
    MissingConfig(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}
