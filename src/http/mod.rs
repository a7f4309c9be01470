//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → dispatch.rs (resolve, filter, forward)
//!         → upstream.rs (outbound call)
//!         → response.rs (CORS + security headers)
//!         → encoding.rs + rewrite.rs (HTML links, generic proxy only)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod request;
pub mod response;
pub mod rewrite;
pub mod server;
pub mod upstream;

pub use dispatch::Dispatcher;
pub use error::ProxyError;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
