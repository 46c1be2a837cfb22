//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Mount the dispatcher as the fallback of an Axum router
//! - Wire up middleware (request ID, tracing, timeout, secure headers)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
};
use thiserror::Error;
use tokio::{net::TcpListener, sync::broadcast};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::routing::Router;
use crate::security::secure_headers_middleware;

/// Error type for serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for a [`Router`].
pub struct HttpServer {
    app: axum::Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server from a fully registered router.
    ///
    /// CORS and body-limit settings from `config` are applied to the router.
    pub fn new(config: ServerConfig, mut router: Router) -> Self {
        router.set_cors(config.cors.clone());
        router.set_max_body_bytes(config.request.max_body_bytes);

        tracing::info!(routes = router.table().len(), "Route table built");

        let app = Self::build_app(&config, Arc::new(router));
        Self { app, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServerConfig, router: Arc<Router>) -> axum::Router {
        let security = Arc::new(config.security.clone());

        axum::Router::new()
            .fallback(dispatch_handler)
            .with_state(router)
            .layer(middleware::from_fn_with_state(security, secure_headers_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request.timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled application, for serving or in-process testing.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            https_redirect = self.config.security.https_redirect,
            "HTTP server starting"
        );

        let app = self.app.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

async fn dispatch_handler(State(router): State<Arc<Router>>, request: Request<Body>) -> Response {
    router.dispatch(request).await
}
