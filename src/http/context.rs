//! Per-request context handed to handlers and the authorizer.
//!
//! The authorizer's context carries the request head only; its body is
//! always empty.

use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, Request},
};
use serde::de::DeserializeOwned;

use crate::http::{ResponseWriter, Status};
use crate::routing::Params;

/// Buffered request, its path parameters and its response writer.
///
/// Cheap to clone; every clone refers to the same request and response.
#[derive(Debug, Clone)]
pub struct Context {
    request: Arc<Request<Bytes>>,
    params: Arc<Params>,
    writer: ResponseWriter,
}

impl Context {
    pub fn new(request: Request<Bytes>, params: Params, writer: ResponseWriter) -> Self {
        Self {
            request: Arc::new(request),
            params: Arc::new(params),
            writer,
        }
    }

    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        self.request.body()
    }

    /// Decode the body as JSON.
    ///
    /// Failures come back as `400 Bad Request` carrying the decoder's message,
    /// ready to be returned from the handler.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Status> {
        serde_json::from_slice(self.body()).map_err(|e| Status::BAD_REQUEST.with_error(e.to_string()))
    }

    /// Named path variable of the matched route.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn writer(&self) -> &ResponseWriter {
        &self.writer
    }
}
