//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    response::Response,
};
use serde::Serialize;

use jsongate::{Context, Router, ServerConfig, Status};

pub const TOKEN_HEADER: (&str, &str) = ("authorization", "Bearer X");

#[derive(Serialize)]
struct Custom {
    #[serde(rename = "Foo")]
    foo: &'static str,
    #[serde(rename = "Bar")]
    bar: u32,
}

async fn serve_root(_ctx: Context) -> Option<Status> {
    None
}

async fn serve_custom(ctx: Context) -> Option<Status> {
    ctx.writer()
        .write_json(&Custom { foo: "foo", bar: 1 })
        .expect("custom body encodes");
    None
}

/// Accepts only `Authorization: Bearer X`.
pub async fn bearer_authorizer(ctx: Context) -> Option<Status> {
    match ctx.header("authorization") {
        Some("Bearer X") => None,
        _ => Some(Status::FORBIDDEN),
    }
}

/// `GET /`, `GET /custom`, public `GET /public`, bearer authorizer.
pub fn scenario_router() -> Router {
    let mut router = Router::new();
    router.set_authorizer(bearer_authorizer);
    router.get("/", serve_root).unwrap();
    router.get("/custom", serve_custom).unwrap();
    router.get("/public", serve_custom).unwrap().mark_public();
    router
}

/// Config suitable for plain-HTTP tests.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.security.https_redirect = false;
    config
}

pub fn request(method: Method, uri: &str, headers: &[(&str, &str)], body: &str) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A fully buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub async fn from_response(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        Self {
            status: parts.status,
            headers: parts.headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Dispatch a request straight through `router`.
pub async fn send(router: &Router, method: Method, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
    TestResponse::from_response(router.dispatch(request(method, uri, headers, "")).await).await
}
