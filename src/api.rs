//! HTTP surface: schedule, list, fetch, and unschedule email jobs.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Error;
use crate::jobs::{EmailJob, JobStore, NewEmailJob, Scheduler, StoreError};
use crate::mail::Attachment;

type Result<T> = std::result::Result<T, Error>;
type JsonResult = Result<Json<Value>>;

/// Shared application state, passed by reference to every handler.
#[derive(Clone)]
pub struct Context {
    pub config: Arc<Config>,
    pub store: Arc<dyn JobStore>,
    pub scheduler: Arc<Scheduler>,
}

pub fn router(ctx: Context) -> Router {
    Router::new()
        .route("/schedule-email", post(schedule_email))
        .route("/scheduled-emails", get(list_emails))
        .route("/scheduled-emails/:id", get(get_email).delete(unschedule_email))
        // Attachments are buffered in memory with no size cap
        .layer(DefaultBodyLimit::disable())
        .with_state(ctx)
}

/// `POST /schedule-email` — multipart form with `recipient`, `subject`,
/// `body`, `time`, and any number of `attachments` file parts.
///
/// The record is stored first, then a timer is armed. An unparseable time
/// spec is logged and leaves the job stored but unarmed; the request still
/// succeeds.
async fn schedule_email(State(ctx): State<Context>, mut multipart: Multipart) -> JsonResult {
    let mut recipient = None;
    let mut subject = None;
    let mut body = None;
    let mut time = None;
    let mut attachments = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("recipient") => recipient = Some(field.text().await?),
            Some("subject") => subject = Some(field.text().await?),
            Some("body") => body = Some(field.text().await?),
            Some("time") => time = Some(field.text().await?),
            Some("attachments") => {
                let filename = field
                    .file_name()
                    .unwrap_or("attachment")
                    .to_string();
                let content = field.bytes().await?.to_vec();
                attachments.push(Attachment { filename, content });
            }
            _ => {}
        }
    }

    let new = NewEmailJob {
        recipient: recipient.ok_or(Error::MissingField("recipient"))?,
        subject: subject.ok_or(Error::MissingField("subject"))?,
        body: body.ok_or(Error::MissingField("body"))?,
        time: time.ok_or(Error::MissingField("time"))?,
        attachments,
    };

    let job = ctx.store.create(new).await?;

    if let Err(e) = ctx.scheduler.arm(&job).await {
        tracing::warn!(job_id = %job.id, error = %e, "job stored but not armed");
    }

    Ok(Json(json!({ "message": "Email scheduled successfully", "job": job })))
}

/// `GET /scheduled-emails` — every stored job.
async fn list_emails(State(ctx): State<Context>) -> JsonResult {
    let jobs = ctx.store.list().await?;
    Ok(Json(json!({ "message": "Emails scheduled", "jobs": jobs })))
}

/// `GET /scheduled-emails/:id` — a single job, or `null` if the id is
/// unknown (still HTTP 200).
async fn get_email(State(ctx): State<Context>, Path(id): Path<String>) -> JsonResult {
    let id = Uuid::parse_str(&id)?;
    let job = found(ctx.store.get(id).await)?;
    Ok(Json(json!({ "message": "Email scheduled", "job": job })))
}

/// `DELETE /scheduled-emails/:id` — remove the record and cancel its armed
/// timer. An unknown id yields `null` with HTTP 200.
async fn unschedule_email(State(ctx): State<Context>, Path(id): Path<String>) -> JsonResult {
    let id = Uuid::parse_str(&id)?;
    let removed = found(ctx.store.delete(id).await)?;

    if let Some(job) = &removed {
        // The record is already gone; a stray timer disappears at next restart
        if let Err(e) = ctx.scheduler.cancel(job.id).await {
            tracing::warn!(job_id = %job.id, error = %e, "failed to cancel timer");
        }
    }

    Ok(Json(json!({ "message": "Email unscheduled", "job": removed })))
}

/// Map a store lookup to `Some`/`None`, keeping NotFound out of the error
/// path: the API reports missing ids as a `null` job, not a failure.
fn found(result: std::result::Result<EmailJob, StoreError>) -> Result<Option<EmailJob>> {
    match result {
        Ok(job) => Ok(Some(job)),
        Err(StoreError::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
