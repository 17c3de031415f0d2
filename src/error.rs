use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::jobs::StoreError;

/// API-facing error type.
///
/// Every failure surfaced by a handler renders as HTTP 500 with the raw
/// error message as a plain-text body. Not-found lookups never reach this
/// type: the handlers map them to a `null` job in a successful response.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing form field `{0}`")]
    MissingField(&'static str),

    #[error("invalid job id: {0}")]
    InvalidId(#[from] uuid::Error),

    #[error(transparent)]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Trace server errors; the response body carries only the message
        tracing::error!("request failed: {self}");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
