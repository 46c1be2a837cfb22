//! The router context object.
//!
//! # Responsibilities
//! - Own the route table and the authorizer
//! - Expose the registration API used at startup
//! - Recover path parameters for a request
//!
//! # Design Decisions
//! - Registration takes `&mut self`; once wrapped in `Arc` for serving the
//!   table is immutable and shared without locks
//! - One authorizer per router, last one set wins

use std::sync::Arc;

use axum::http::{Method, Request};

use crate::config::CorsConfig;
use crate::routing::handler::Handler;
use crate::routing::pattern::RouteError;
use crate::routing::table::{Binding, Params, Route, RouteTable};

/// Default cap on buffered request bodies (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Routes, authorizer and response policy for one service.
pub struct Router {
    table: RouteTable,
    authorizer: Option<Arc<dyn Handler>>,
    cors: CorsConfig,
    max_body_bytes: usize,
}

impl Router {
    pub fn new() -> Self {
        Self {
            table: RouteTable::new(),
            authorizer: None,
            cors: CorsConfig::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Bind `handler` to `method` on `template`.
    ///
    /// Bindings are private until marked public:
    ///
    /// ```ignore
    /// router.get("/health", health)?.mark_public();
    /// ```
    pub fn route<H: Handler>(
        &mut self,
        method: Method,
        template: &str,
        handler: H,
    ) -> Result<&mut Binding, RouteError> {
        self.table.register(method, template, Arc::new(handler))
    }

    pub fn get<H: Handler>(&mut self, template: &str, handler: H) -> Result<&mut Binding, RouteError> {
        self.route(Method::GET, template, handler)
    }

    pub fn post<H: Handler>(&mut self, template: &str, handler: H) -> Result<&mut Binding, RouteError> {
        self.route(Method::POST, template, handler)
    }

    pub fn put<H: Handler>(&mut self, template: &str, handler: H) -> Result<&mut Binding, RouteError> {
        self.route(Method::PUT, template, handler)
    }

    pub fn patch<H: Handler>(&mut self, template: &str, handler: H) -> Result<&mut Binding, RouteError> {
        self.route(Method::PATCH, template, handler)
    }

    pub fn delete<H: Handler>(&mut self, template: &str, handler: H) -> Result<&mut Binding, RouteError> {
        self.route(Method::DELETE, template, handler)
    }

    /// Install the gate consulted for private bindings.
    ///
    /// A returned status outside 200..=299 is sent as the response and the
    /// handler is skipped; `None` or a 2xx status lets the request through.
    pub fn set_authorizer<H: Handler>(&mut self, authorizer: H) {
        self.authorizer = Some(Arc::new(authorizer));
    }

    pub(crate) fn authorizer(&self) -> Option<&Arc<dyn Handler>> {
        self.authorizer.as_ref()
    }

    pub fn set_cors(&mut self, cors: CorsConfig) {
        self.cors = cors;
    }

    pub fn cors(&self) -> &CorsConfig {
        &self.cors
    }

    pub fn set_max_body_bytes(&mut self, limit: usize) {
        self.max_body_bytes = limit;
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// First registered route matching `path`.
    pub fn find_route(&self, path: &str) -> Option<&Route> {
        self.table.find(path)
    }

    /// Path variables of `request` under its matching route.
    pub fn extract_params<B>(&self, request: &Request<B>) -> Params {
        self.params_for(request.uri().path())
    }

    /// Path variables of `path` under its matching route.
    pub fn params_for(&self, path: &str) -> Params {
        self.table.params(path)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("authorizer", &self.authorizer.is_some())
            .field("cors", &self.cors)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}
