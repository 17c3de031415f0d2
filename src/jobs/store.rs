use async_trait::async_trait;
use uuid::Uuid;

use super::entry::{EmailJob, NewEmailJob};

/// Errors surfaced by a [`JobStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("job not found")]
    NotFound,

    #[error("store error: {0}")]
    Backend(String),
}

/// Backend-agnostic storage for scheduled email jobs.
///
/// Implementations perform no validation: a record with a malformed time
/// string is persisted as-is and only rejected later, when the scheduler
/// tries to arm it. Each method maps to a single storage operation.
#[async_trait]
pub trait JobStore: Send + Sync + 'static {
    /// Persist a new job, assigning its id. Returns the stored record.
    async fn create(&self, new: NewEmailJob) -> Result<EmailJob, StoreError>;

    /// All records, in no particular order.
    async fn list(&self) -> Result<Vec<EmailJob>, StoreError>;

    /// Look up a record by id.
    async fn get(&self, id: Uuid) -> Result<EmailJob, StoreError>;

    /// Remove a record by id, returning the removed value.
    async fn delete(&self, id: Uuid) -> Result<EmailJob, StoreError>;
}
