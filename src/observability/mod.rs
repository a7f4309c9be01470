//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → http::request (request ID on every span)
//!
//! Consumers:
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request span
//! - Upstream failures are logged once, server-side only

pub mod logging;

pub use logging::init_logging;
