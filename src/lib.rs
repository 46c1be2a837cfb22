//! JSON API routing and authorization on top of Axum.
//!
//! Register method + path handlers on a [`Router`], install an authorizer,
//! and serve it with [`HttpServer`]. Every binding requires authorization
//! unless marked public; `OPTIONS` responses are generated from the route
//! table; every response body is a JSON [`Status`] envelope unless the
//! handler writes its own.
//!
//! ```ignore
//! let mut router = Router::new();
//! router.set_authorizer(|ctx: Context| async move {
//!     match ctx.header("authorization") {
//!         Some("Bearer secret") => None,
//!         _ => Some(Status::FORBIDDEN),
//!     }
//! });
//! router.get("/items/:id", |ctx: Context| async move {
//!     let id = ctx.param("id").unwrap_or_default().to_string();
//!     ctx.writer().write_json(&serde_json::json!({ "id": id })).ok()?;
//!     None
//! })?;
//! router.get("/health", |_ctx: Context| async move { Some(Status::NO_CONTENT) })?
//!     .mark_public();
//!
//! HttpServer::new(config, router).run(listener, shutdown.subscribe()).await?;
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::ServerConfig;
pub use http::{Context, HttpServer, ResponseWriter, Status};
pub use lifecycle::Shutdown;
pub use routing::{Binding, Params, RouteError, Router};
