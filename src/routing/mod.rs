//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Router::get/post/... (method, template, handler)
//!     → pattern.rs (tokenize template, reject malformed ones)
//!     → table.rs (append route or add binding to existing route)
//!
//! Incoming request path:
//!     → table.rs (first route in registration order that matches)
//!     → pattern.rs (capture variable values)
//!     → Return: matched Route + Params, or no match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex: templates are matched segment by segment
//! - First match wins (ordered by registration)

pub mod handler;
pub mod pattern;
pub mod router;
pub mod table;

pub use handler::{BoxFuture, Handler};
pub use pattern::{PathPattern, RouteError, Segment};
pub use router::Router;
pub use table::{Binding, Params, Route, RouteTable};
