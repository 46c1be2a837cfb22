//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (HTTPS redirect when enabled)
//!     → Pass to dispatcher
//!     → headers.rs (secure response headers)
//! ```
//!
//! # Design Decisions
//! - HTTPS redirection is on unless explicitly disabled
//! - Applied outside the dispatcher so redirects skip routing entirely

pub mod headers;

pub use headers::secure_headers_middleware;
