//! Email payload types.

use serde::{Deserialize, Serialize};

/// A named binary attachment.
///
/// The content is raw bytes, buffered in memory; the filename is whatever the
/// uploader supplied. Sent as `application/octet-stream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    #[serde(with = "serde_bytes")]
    pub content: Vec<u8>,
}

/// A complete email ready to hand to a [`Mailer`](super::Mailer).
///
/// Built from a stored job at arm time; the scheduler captures this payload
/// in the timer callback rather than re-reading the store at fire time.
#[derive(Debug, Clone)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}
