//! Secure response headers and HTTPS redirection.
//!
//! # Responsibilities
//! - Redirect plain HTTP requests to HTTPS (301)
//! - Add HSTS on HTTPS responses
//! - Add X-Frame-Options, X-Content-Type-Options, X-XSS-Protection
//!
//! # Design Decisions
//! - `X-Forwarded-Proto` is only trusted when configured
//! - Requests without a usable Host cannot be redirected and get a 400

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::SecurityConfig;
use crate::http::{status_response, Status};

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Whether the request arrived over HTTPS.
fn is_https<B>(config: &SecurityConfig, request: &Request<B>) -> bool {
    if config.use_forwarded_proto {
        return request
            .headers()
            .get(X_FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));
    }
    request.uri().scheme_str() == Some("https")
}

fn is_loopback<B>(request: &Request<B>) -> bool {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .is_some_and(|ConnectInfo(addr)| addr.ip().is_loopback())
}

/// `301` to the same host and path over HTTPS.
fn redirect_to_https<B>(request: &Request<B>) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()));
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let location = host.and_then(|host| HeaderValue::from_str(&format!("https://{}{}", host, path)).ok());
    let Some(location) = location else {
        tracing::warn!("Cannot redirect to HTTPS without a Host");
        return status_response(Status::BAD_REQUEST.with_error("missing host"));
    };

    tracing::debug!(location = ?location, "Redirecting to HTTPS");
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::MOVED_PERMANENTLY;
    response.headers_mut().insert(header::LOCATION, location);
    response
}

/// Middleware applying [`SecurityConfig`].
pub async fn secure_headers_middleware(
    State(config): State<Arc<SecurityConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let https = is_https(&config, &request);
    if config.https_redirect && !https && !(config.permit_clear_loopback && is_loopback(&request)) {
        return redirect_to_https(&request);
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    if https && config.hsts_max_age_secs > 0 {
        let mut hsts = format!("max-age={}", config.hsts_max_age_secs);
        if config.hsts_include_subdomains {
            hsts.push_str("; includeSubDomains");
        }
        if let Ok(value) = HeaderValue::from_str(&hsts) {
            headers.insert(header::STRICT_TRANSPORT_SECURITY, value);
        }
    }
    if config.frame_options {
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    }
    if config.content_type_options {
        headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    }
    if config.xss_protection {
        let value = if config.xss_protection_block { "1; mode=block" } else { "1" };
        headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static(value));
    }

    response
}
