//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! server.rs (per-request span: method, path, request ID)
//!     → dispatch.rs (structured events: denials, 404/405, handler panics)
//!     → logging.rs (subscriber: env filter + fmt layer)
//!     → stdout
//! ```

pub mod logging;
