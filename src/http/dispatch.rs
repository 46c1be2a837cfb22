//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! Request
//!     → Content-Type check          (present and not JSON → 400)
//!     → route lookup                (no match → 404)
//!     → OPTIONS                     (Allow header, empty 200, stop)
//!     → method lookup               (unbound → 405)
//!     → authorization gate          (private binding only, headers only)
//!     → body buffering              (unreadable or too large → 400)
//!     → handler                     (panic → 500)
//!     → write-once status write
//! ```
//!
//! Every response carries `Content-Type: application/json`.
//!
//! The authorizer sees the request head with an empty body. The body is
//! only read once the gate has passed.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    http::{
        header::{self, HeaderMap, HeaderValue},
        Method, Request, StatusCode,
    },
    response::Response,
};
use futures_util::FutureExt;

use crate::http::{Context, ResponseWriter, Status};
use crate::routing::{Handler, Router};

/// The only accepted request media type, also used for every response.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A bare JSON status response outside the dispatcher.
pub fn status_response(status: Status) -> Response {
    let writer = ResponseWriter::new();
    writer.set_header(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    writer.write_status(Some(status));
    writer.into_response()
}

impl Router {
    /// Route `request` and produce its response.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        let writer = ResponseWriter::new();
        writer.set_header(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        self.apply_cors(&writer, request.headers());

        self.dispatch_into(&writer, request).await;

        let response = writer.into_response();
        tracing::debug!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            "Request dispatched"
        );
        response
    }

    async fn dispatch_into(&self, writer: &ResponseWriter, request: Request<Body>) {
        if let Some(content_type) = request.headers().get(header::CONTENT_TYPE) {
            if content_type.as_bytes() != JSON_CONTENT_TYPE.as_bytes() {
                tracing::warn!(content_type = ?content_type, "Rejected request content type");
                writer.write_status(Some(Status::BAD_REQUEST));
                return;
            }
        }

        let path = request.uri().path();
        let Some(route) = self.find_route(path) else {
            tracing::warn!(path = %path, "No route matched");
            writer.write_status(Some(Status::NOT_FOUND));
            return;
        };

        if request.method() == Method::OPTIONS {
            if let Ok(allow) = HeaderValue::from_str(&route.allow()) {
                writer.set_header(header::ACCESS_CONTROL_ALLOW_METHODS, allow.clone());
                writer.set_header(header::ALLOW, allow);
            }
            writer.set_header(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
            writer.write_header(StatusCode::OK);
            return;
        }

        let Some(binding) = route.binding(request.method()) else {
            tracing::warn!(
                method = %request.method(),
                template = %route.template(),
                "Method not allowed"
            );
            writer.write_status(Some(Status::METHOD_NOT_ALLOWED));
            return;
        };

        let params = route.params(path);
        let (parts, body) = request.into_parts();

        if !binding.is_public() {
            let head = Context::new(
                Request::from_parts(parts.clone(), Bytes::new()),
                params.clone(),
                writer.clone(),
            );
            if let Some(denied) = self.authorize(&head).await {
                tracing::warn!(
                    path = %head.path(),
                    code = denied.code(),
                    "Authorization denied"
                );
                writer.write_status(Some(denied));
                return;
            }
        }

        let body = match axum::body::to_bytes(body, self.max_body_bytes()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, limit = self.max_body_bytes(), "Failed to read request body");
                writer.write_status(Some(
                    Status::BAD_REQUEST.with_error("request body could not be read"),
                ));
                return;
            }
        };
        let ctx = Context::new(Request::from_parts(parts, body), params, writer.clone());

        let status = invoke(binding.handler(), ctx).await;
        writer.write_status(status);
    }

    /// `Some(status)` if the request must be rejected.
    async fn authorize(&self, ctx: &Context) -> Option<Status> {
        let Some(authorizer) = self.authorizer() else {
            return Some(Status::FORBIDDEN);
        };

        match invoke(authorizer, ctx.clone()).await {
            Some(status) if !status.is_success() => Some(status),
            _ => None,
        }
    }

    fn apply_cors(&self, writer: &ResponseWriter, request_headers: &HeaderMap) {
        let cors = self.cors();
        if cors.mirror_origin {
            if let Some(origin) = request_headers.get(header::ORIGIN) {
                writer.set_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            }
        }
        if !cors.allow_headers.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&cors.allow_headers.join(", ")) {
                writer.set_header(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
            }
        }
    }
}

/// Run a handler, turning a panic into `500 Internal Server Error`.
async fn invoke(handler: &Arc<dyn Handler>, ctx: Context) -> Option<Status> {
    let path = ctx.path().to_owned();
    match AssertUnwindSafe(async move { handler.call(ctx).await })
        .catch_unwind()
        .await
    {
        Ok(status) => status,
        Err(panic) => {
            tracing::error!(path = %path, panic = %panic_message(&*panic), "Handler panicked");
            Some(Status::INTERNAL_SERVER_ERROR)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
