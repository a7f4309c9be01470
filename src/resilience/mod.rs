//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce connect + response-header deadline)
//!     → On failure: surfaced once to the dispatcher
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries: a single failed attempt is terminal for the request

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineExceeded};
