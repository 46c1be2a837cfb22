//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → dispatch.rs (content type, route, OPTIONS, method, auth, handler)
//!     → writer.rs (write-once status/body)
//!     → Send to client
//! ```

pub mod context;
pub mod dispatch;
pub mod request;
pub mod server;
pub mod status;
pub mod writer;

pub use context::Context;
pub use dispatch::{status_response, JSON_CONTENT_TYPE};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
pub use status::Status;
pub use writer::ResponseWriter;
