//! Write-once response buffering.
//!
//! # Responsibilities
//! - Collect headers, status line and body written by the dispatcher and
//!   the handler for one request
//! - Track whether a status line and body bytes have been written
//! - Make the final status write idempotent
//!
//! # Design Decisions
//! - One writer per request, shared by handle between dispatcher and handler
//! - The first status line wins; later attempts are dropped
//! - `write_status` is a no-op once the handler wrote body bytes itself

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use serde::Serialize;

use crate::http::status::Status;

#[derive(Debug, Default)]
struct WriterState {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
    body_written: bool,
    status_body_written: bool,
}

/// Per-request response sink with write-once semantics.
///
/// Cloning yields another handle to the same response.
#[derive(Debug, Clone, Default)]
pub struct ResponseWriter {
    inner: Arc<Mutex<WriterState>>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    // A handler that panicked mid-write leaves the lock poisoned; the
    // buffered state is still usable for the 500 that follows.
    fn state(&self) -> MutexGuard<'_, WriterState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set a response header, replacing any previous value.
    ///
    /// Ignored once the status line has been written.
    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        let mut state = self.state();
        if state.status.is_some() {
            tracing::debug!(header = %name, "Header set after status line, ignoring");
            return;
        }
        state.headers.insert(name, value);
    }

    /// Current value of a response header.
    pub fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.state().headers.get(name).cloned()
    }

    /// Write the status line. Returns false if one was already written.
    pub fn write_header(&self, code: StatusCode) -> bool {
        let mut state = self.state();
        if state.status.is_some() {
            return false;
        }
        state.status = Some(code);
        true
    }

    /// Append raw body bytes, writing a `200 OK` status line first if none
    /// has been written yet.
    pub fn write(&self, bytes: &[u8]) {
        let mut state = self.state();
        state.status.get_or_insert(StatusCode::OK);
        state.body.extend_from_slice(bytes);
        state.body_written = true;
    }

    /// Serialize `value` as JSON and append it to the body.
    pub fn write_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        self.write(&bytes);
        Ok(())
    }

    /// Write `status` as the final response, `None` meaning OK.
    ///
    /// Only the first call takes effect, and none does if body bytes were
    /// already written. The status line is kept if the handler wrote one.
    /// `204 No Content` gets no body. Returns whether anything was written.
    pub fn write_status(&self, status: Option<Status>) -> bool {
        let mut status = status.unwrap_or(Status::OK);
        if StatusCode::from_u16(status.code()).is_err() {
            tracing::error!(code = status.code(), "Status code cannot be sent, using 500");
            status = Status::INTERNAL_SERVER_ERROR;
        }
        let mut state = self.state();
        if state.status_body_written || state.body_written {
            return false;
        }
        state.status_body_written = true;

        let code = *state.status.get_or_insert(status.status_code());
        if status.code() == 204 || code == StatusCode::NO_CONTENT {
            return true;
        }

        match serde_json::to_vec(&status) {
            Ok(bytes) => {
                state.body = bytes;
                state.body_written = true;
            }
            Err(e) => tracing::error!(error = %e, code = status.code(), "Failed to encode status"),
        }
        true
    }

    pub fn is_header_written(&self) -> bool {
        self.state().status.is_some()
    }

    pub fn is_body_written(&self) -> bool {
        self.state().body_written
    }

    /// Drain the buffered response. Other handles are left empty.
    pub fn into_response(self) -> Response {
        let state = std::mem::take(&mut *self.state());
        let mut response = Response::new(Body::from(state.body));
        *response.status_mut() = state.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = state.headers;
        response
    }
}
