//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (allow-list projection)
//!     → Upstream request
//!
//! Upstream response:
//!     → headers.rs (strip hop-by-hop)
//!     → http::response (CORS + security headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: unknown request headers never reach an upstream
//! - No trust in client input

pub mod headers;

pub use headers::{HeaderPolicy, ALLOWED_HEADER_NAMES};
