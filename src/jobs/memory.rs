use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::entry::{EmailJob, NewEmailJob};
use super::store::{JobStore, StoreError};

/// In-memory [`JobStore`] for development and testing.
///
/// Jobs are stored in a `Vec` behind a mutex. Not durable — all jobs are
/// lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    jobs: Arc<Mutex<Vec<EmailJob>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create(&self, new: NewEmailJob) -> Result<EmailJob, StoreError> {
        let job = new.with_id(Uuid::new_v4());
        let mut jobs = self.jobs.lock().await;
        jobs.push(job.clone());
        Ok(job)
    }

    async fn list(&self) -> Result<Vec<EmailJob>, StoreError> {
        let jobs = self.jobs.lock().await;
        Ok(jobs.clone())
    }

    async fn get(&self, id: Uuid) -> Result<EmailJob, StoreError> {
        let jobs = self.jobs.lock().await;
        jobs.iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<EmailJob, StoreError> {
        let mut jobs = self.jobs.lock().await;
        let pos = jobs
            .iter()
            .position(|j| j.id == id)
            .ok_or(StoreError::NotFound)?;
        Ok(jobs.remove(pos))
    }
}
