use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mail::{Attachment, Email};

/// A scheduled email, as persisted in the job store.
///
/// The `time` field is kept verbatim as submitted. Parsing into a
/// [`TimeSpec`] happens only when the scheduler arms a timer, so a record
/// with an unparseable time is stored and listed like any other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailJob {
    pub id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub time: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Fields of a job before the store has assigned an id.
#[derive(Debug, Clone)]
pub struct NewEmailJob {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub time: String,
    pub attachments: Vec<Attachment>,
}

impl NewEmailJob {
    /// Attach a store-assigned id, producing the persisted record.
    pub fn with_id(self, id: Uuid) -> EmailJob {
        EmailJob {
            id,
            recipient: self.recipient,
            subject: self.subject,
            body: self.body,
            time: self.time,
            attachments: self.attachments,
        }
    }
}

impl From<&EmailJob> for Email {
    fn from(job: &EmailJob) -> Self {
        Email {
            to: job.recipient.clone(),
            subject: job.subject.clone(),
            body: job.body.clone(),
            attachments: job.attachments.clone(),
        }
    }
}

/// Error for a time string that is neither a timestamp nor a cron expression.
#[derive(Debug, thiserror::Error)]
#[error("unparseable time spec: {0:?}")]
pub struct InvalidTimeSpec(pub String);

/// Parsed form of a job's `time` string.
///
/// Absolute timestamps (RFC 3339, or a naive `Y-m-d H:M:S` treated as UTC)
/// schedule a one-shot firing; anything that parses as a cron expression
/// schedules a recurrence.
#[derive(Debug, Clone)]
pub enum TimeSpec {
    /// Fire once at this instant.
    At(DateTime<Utc>),
    /// Fire on every occurrence of this schedule.
    Cron(cron::Schedule),
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

impl FromStr for TimeSpec {
    type Err = InvalidTimeSpec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::At(dt.with_timezone(&Utc)));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self::At(naive.and_utc()));
            }
        }

        if let Ok(schedule) = cron::Schedule::from_str(s) {
            // A schedule with no upcoming occurrence would never fire
            if schedule.upcoming(Utc).next().is_none() {
                return Err(InvalidTimeSpec(s.to_string()));
            }
            return Ok(Self::Cron(schedule));
        }

        Err(InvalidTimeSpec(s.to_string()))
    }
}
