use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use sendlater::jobs::{JobStore, MemoryStore, NewEmailJob, Scheduler, SchedulerError};
use sendlater::mail::{Attachment, Email, MailError, Mailer};

#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<Email>>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FailingMailer {
    attempts: Arc<Mutex<usize>>,
}

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &Email) -> Result<(), MailError> {
        *self.attempts.lock().await += 1;
        Err(MailError::Smtp("connection refused".into()))
    }
}

fn job_firing_in(seconds: i64) -> NewEmailJob {
    NewEmailJob {
        recipient: "a@b.com".into(),
        subject: "Hi".into(),
        body: "Test".into(),
        time: (Utc::now() + chrono::Duration::seconds(seconds)).to_rfc3339(),
        attachments: vec![],
    }
}

async fn sends(mailer: &RecordingMailer) -> usize {
    mailer.sent.lock().await.len()
}

async fn wait_for_sends(mailer: &RecordingMailer, want: usize, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if sends(mailer).await >= want {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

#[tokio::test]
async fn one_shot_fires_once_with_captured_payload() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();
    let scheduler = Scheduler::new(Arc::new(mailer.clone())).await.unwrap();
    scheduler.start().await.unwrap();

    let mut new = job_firing_in(3);
    new.attachments.push(Attachment {
        filename: "note.txt".into(),
        content: b"hello".to_vec(),
    });
    let job = store.create(new).await.unwrap();
    scheduler.arm(&job).await.unwrap();
    assert_eq!(scheduler.armed_count().await, 1);

    // Nothing goes out before the scheduled time
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(sends(&mailer).await, 0);

    assert!(wait_for_sends(&mailer, 1, Duration::from_secs(15)).await);
    let sent = mailer.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@b.com");
    assert_eq!(sent[0].subject, "Hi");
    assert_eq!(sent[0].body, "Test");
    assert_eq!(sent[0].attachments.len(), 1);
    drop(sent);

    // One-shot: no second firing, and the registry entry is gone
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(sends(&mailer).await, 1);
    assert_eq!(scheduler.armed_count().await, 0);
}

#[tokio::test]
async fn elapsed_one_shot_is_rejected() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();
    let scheduler = Scheduler::new(Arc::new(mailer.clone())).await.unwrap();

    let mut new = job_firing_in(0);
    new.time = "2000-01-01T00:00:00Z".into();
    let job = store.create(new).await.unwrap();

    let err = scheduler.arm(&job).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Elapsed(_)));
    assert_eq!(scheduler.armed_count().await, 0);
}

#[tokio::test]
async fn unparseable_spec_is_rejected() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();
    let scheduler = Scheduler::new(Arc::new(mailer.clone())).await.unwrap();

    let mut new = job_firing_in(0);
    new.time = "whenever".into();
    let job = store.create(new).await.unwrap();

    let err = scheduler.arm(&job).await.unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidSpec(_)));
    assert_eq!(scheduler.armed_count().await, 0);
}

#[tokio::test]
async fn cancel_prevents_firing() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();
    let scheduler = Scheduler::new(Arc::new(mailer.clone())).await.unwrap();
    scheduler.start().await.unwrap();

    let job = store.create(job_firing_in(2)).await.unwrap();
    scheduler.arm(&job).await.unwrap();

    assert!(scheduler.cancel(job.id).await.unwrap());
    assert!(!scheduler.cancel(job.id).await.unwrap());
    assert_eq!(scheduler.armed_count().await, 0);

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(sends(&mailer).await, 0);
}

#[tokio::test]
async fn rearming_replaces_the_previous_timer() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();
    let scheduler = Scheduler::new(Arc::new(mailer.clone())).await.unwrap();

    let job = store.create(job_firing_in(3600)).await.unwrap();
    scheduler.arm(&job).await.unwrap();
    scheduler.arm(&job).await.unwrap();

    assert_eq!(scheduler.armed_count().await, 1);
}

#[tokio::test]
async fn rehydrate_arms_every_parseable_record() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();
    let scheduler = Scheduler::new(Arc::new(mailer.clone())).await.unwrap();

    store.create(job_firing_in(3600)).await.unwrap();
    store.create(job_firing_in(7200)).await.unwrap();
    let mut bad = job_firing_in(0);
    bad.time = "whenever".into();
    store.create(bad).await.unwrap();

    let armed = scheduler.rehydrate(&store).await.unwrap();
    assert_eq!(armed, 2);
    assert_eq!(scheduler.armed_count().await, 2);

    // The id-keyed registry replaces on re-arm instead of double-arming
    let armed = scheduler.rehydrate(&store).await.unwrap();
    assert_eq!(armed, 2);
    assert_eq!(scheduler.armed_count().await, 2);
}

#[tokio::test]
async fn dispatch_failure_is_swallowed_without_retry() {
    let store = MemoryStore::new();
    let mailer = FailingMailer::default();
    let scheduler = Scheduler::new(Arc::new(mailer.clone())).await.unwrap();
    scheduler.start().await.unwrap();

    let job = store.create(job_firing_in(2)).await.unwrap();
    scheduler.arm(&job).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
    while tokio::time::Instant::now() < deadline {
        if *mailer.attempts.lock().await >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(*mailer.attempts.lock().await, 1);

    // At most one attempt, ever
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(*mailer.attempts.lock().await, 1);
}
