use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job as Timer, JobScheduler};
use uuid::Uuid;

use super::entry::{EmailJob, TimeSpec};
use super::store::JobStore;
use crate::mail::{Email, Mailer};

use super::SchedulerError;

/// In-process timer registry that dispatches stored jobs to a [`Mailer`].
///
/// Owns a [`JobScheduler`] runtime plus a map from job id to the armed
/// timer's handle, so unscheduling a job can cancel its timer. Constructed
/// once at startup and shared through the application context.
///
/// ```ignore
/// let scheduler = Scheduler::new(Arc::new(mailer)).await?;
/// scheduler.rehydrate(&store).await?;
/// scheduler.start().await?;
/// ```
pub struct Scheduler {
    inner: JobScheduler,
    mailer: Arc<dyn Mailer>,
    armed: Arc<Mutex<HashMap<Uuid, Uuid>>>,
}

impl Scheduler {
    pub async fn new(mailer: Arc<dyn Mailer>) -> Result<Self, SchedulerError> {
        Ok(Self {
            inner: JobScheduler::new().await?,
            mailer,
            armed: Arc::default(),
        })
    }

    /// Arm a timer for `job`, replacing any timer already armed for its id.
    ///
    /// An absolute time spec arms a one-shot firing; a cron spec arms a
    /// recurrence. The dispatch payload is captured here: a job edited or
    /// deleted in the store after arming does not change what gets sent.
    ///
    /// Errors here never fail the request that stored the job: callers log
    /// and move on, leaving the record without a timer.
    pub async fn arm(&self, job: &EmailJob) -> Result<(), SchedulerError> {
        let spec: TimeSpec = job.time.parse()?;
        let email = Email::from(job);
        let mailer = self.mailer.clone();
        let armed = self.armed.clone();
        let job_id = job.id;

        let timer = match spec {
            TimeSpec::At(when) => {
                let delay = (when - Utc::now())
                    .to_std()
                    .map_err(|_| SchedulerError::Elapsed(job.time.clone()))?;

                Timer::new_one_shot_async(delay, move |_timer_id, _scheduler| {
                    let mailer = mailer.clone();
                    let email = email.clone();
                    let armed = armed.clone();
                    Box::pin(async move {
                        armed.lock().await.remove(&job_id);
                        dispatch(job_id, mailer, email);
                    })
                })?
            }
            TimeSpec::Cron(_) => {
                Timer::new_async(job.time.trim(), move |_timer_id, _scheduler| {
                    let mailer = mailer.clone();
                    let email = email.clone();
                    Box::pin(async move {
                        dispatch(job_id, mailer, email);
                    })
                })?
            }
        };

        let mut inner = self.inner.clone();
        let handle = inner.add(timer).await?;

        let previous = self.armed.lock().await.insert(job_id, handle);
        if let Some(previous) = previous {
            inner.remove(&previous).await?;
        }

        tracing::debug!(%job_id, %handle, time = %job.time, "armed timer");
        Ok(())
    }

    /// Cancel the armed timer for a job id, if one is live.
    ///
    /// Returns whether a timer was cancelled. A one-shot that already fired
    /// has no registry entry left, so cancelling it is a no-op; the email
    /// it sent is not clawed back.
    pub async fn cancel(&self, job_id: Uuid) -> Result<bool, SchedulerError> {
        let handle = self.armed.lock().await.remove(&job_id);
        match handle {
            Some(handle) => {
                let mut inner = self.inner.clone();
                inner.remove(&handle).await?;
                tracing::debug!(%job_id, %handle, "cancelled timer");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Re-arm a timer for every record currently in the store.
    ///
    /// Called once at boot. Jobs whose time spec is unparseable or already
    /// elapsed are logged and skipped. Returns the number armed. Because the
    /// registry is keyed by job id, running this twice replaces timers
    /// rather than double-arming them.
    pub async fn rehydrate(&self, store: &dyn JobStore) -> Result<usize, SchedulerError> {
        let jobs = store.list().await?;
        let mut count = 0;

        for job in jobs {
            match self.arm(&job).await {
                Ok(()) => count += 1,
                Err(e) => {
                    tracing::warn!(job_id = %job.id, error = %e, "skipping job during rehydration")
                }
            }
        }

        Ok(count)
    }

    /// Number of currently armed timers.
    pub async fn armed_count(&self) -> usize {
        self.armed.lock().await.len()
    }

    /// Start the timer runtime. Arming works before and after this call.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut inner = self.inner.clone();
        inner.start().await?;
        tracing::info!("⏳ Scheduler running");
        Ok(())
    }
}

/// Hand the payload to the mailer on its own task and log the outcome.
///
/// Dispatch is at-most-once: a failure is logged and swallowed, never
/// retried, and never recorded on the job.
fn dispatch(job_id: Uuid, mailer: Arc<dyn Mailer>, email: Email) {
    tokio::spawn(async move {
        match mailer.send(&email).await {
            Ok(()) => {
                tracing::info!(%job_id, recipient = %email.to, "email dispatched")
            }
            Err(e) => {
                tracing::error!(%job_id, recipient = %email.to, error = %e, "email dispatch failed")
            }
        }
    });
}
