//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → resolver.rs (static page? /proxy/<url>? table prefix?)
//!     → table.rs (ordered prefix scan)
//!     → matcher.rs (evaluate prefix condition)
//!     → Return: Route or RouteError
//!
//! Route Table (at startup):
//!     (prefix, upstream)[]
//!     → Validate (leading slash, distinct, absolute URL)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod resolver;
pub mod table;

pub use resolver::{ProxyMode, ProxyTarget, Resolver, Route, RouteError, StaticPage};
pub use table::{RouteTable, RouteTableError};
