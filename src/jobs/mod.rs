//! Scheduled email jobs: storage and timer dispatch.
//!
//! # Architecture
//!
//! - [`EmailJob`] — The persisted record: recipient, subject, body, a raw
//!   time string, and attachment blobs.
//! - [`TimeSpec`] — Parsed form of the time string: an absolute instant
//!   (one-shot) or a cron expression (recurring).
//! - [`JobStore`] — Backend-agnostic CRUD trait over the job collection.
//! - [`MemoryStore`] — In-memory store for development and testing.
//! - [`MongoStore`] — MongoDB-backed store used in production.
//! - [`Scheduler`] — Timer registry keyed by job id; arms a timer per job,
//!   dispatches to a [`Mailer`](crate::mail::Mailer) on firing, and
//!   re-arms everything from the store at boot.
//!
//! Store writes and timer registration are two separate steps with no
//! transaction between them; rehydration at boot is what re-establishes
//! the record-has-timer invariant.

mod entry;
mod memory;
mod mongo;
mod scheduler;
mod store;

pub use entry::{EmailJob, InvalidTimeSpec, NewEmailJob, TimeSpec};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use scheduler::Scheduler;
pub use store::{JobStore, StoreError};

use tokio_cron_scheduler::JobSchedulerError;

/// Errors from arming, cancelling, or rehydrating timers.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    InvalidSpec(#[from] InvalidTimeSpec),

    #[error("scheduled time already passed: {0:?}")]
    Elapsed(String),

    #[error("scheduler error: {0}")]
    Schedule(#[from] JobSchedulerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
