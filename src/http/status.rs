//! Semantic request outcomes.
//!
//! A [`Status`] is both the value handlers return and the JSON envelope
//! written as the response body:
//!
//! ```text
//! {"Code": 404, "Message": "Not Found", "Errors": ["..."]}
//! ```
//!
//! `Errors` is omitted when empty.

use std::borrow::Cow;

use axum::http::StatusCode;
use serde::Serialize;

/// An HTTP outcome: code, human-readable message and optional details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    #[serde(rename = "Code")]
    code: u16,

    #[serde(rename = "Message")]
    message: Cow<'static, str>,

    #[serde(rename = "Errors", skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

impl Status {
    pub const OK: Status = Status::new(200, "OK");
    pub const CREATED: Status = Status::new(201, "Created");
    pub const NO_CONTENT: Status = Status::new(204, "No Content");
    pub const BAD_REQUEST: Status = Status::new(400, "Bad Request");
    pub const UNAUTHORIZED: Status = Status::new(401, "Unauthorized");
    pub const FORBIDDEN: Status = Status::new(403, "Forbidden");
    pub const NOT_FOUND: Status = Status::new(404, "Not Found");
    pub const METHOD_NOT_ALLOWED: Status = Status::new(405, "Method Not Allowed");
    pub const CONFLICT: Status = Status::new(409, "Conflict");
    pub const UNPROCESSABLE_ENTITY: Status = Status::new(422, "Unprocessable Entity");
    pub const INTERNAL_SERVER_ERROR: Status = Status::new(500, "Internal Server Error");
    pub const SERVICE_UNAVAILABLE: Status = Status::new(503, "Service Unavailable");

    /// Create a status with a static message.
    pub const fn new(code: u16, message: &'static str) -> Self {
        Self {
            code,
            message: Cow::Borrowed(message),
            errors: Vec::new(),
        }
    }

    /// Create a status using the canonical reason phrase for `code`.
    ///
    /// Codes without a registered phrase get an empty message.
    pub fn from_code(code: u16) -> Self {
        let message = StatusCode::from_u16(code)
            .ok()
            .and_then(|c| c.canonical_reason())
            .unwrap_or("");
        Self::new(code, message)
    }

    /// Replace the message.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Append one detail entry.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    /// Append several detail entries, keeping their order.
    pub fn with_errors<I, S>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors.extend(errors.into_iter().map(Into::into));
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// True for codes in the inclusive range 200..=299.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.code)
    }

    /// The status line code, falling back to 500 for out-of-range values.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::OK
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.message)?;
        if !self.errors.is_empty() {
            write!(f, " ({})", self.errors.join("; "))?;
        }
        Ok(())
    }
}
