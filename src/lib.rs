//! API relay: a reverse proxy for chat/LLM provider APIs.
//!
//! Requests under a known prefix (`/openai`, `/claude`, ...) are forwarded to
//! the provider's API host; `/proxy/<absolute-url>` forwards anywhere and
//! rewrites HTML links so browsing stays inside the relay.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
