//! Route lookup and dispatch decision.
//!
//! # Responsibilities
//! - Recognize the fixed static pages
//! - Recognize the generic `/proxy/<absolute-url>` form
//! - Fall back to the static prefix table
//! - Return the decision or an explicit error, never a silent default
//!
//! # Design Decisions
//! - Pure function of the request URI; no I/O
//! - The generic target is cut from the raw path-and-query, so the embedded
//!   URL keeps its own scheme, host and query string

use std::sync::Arc;

use axum::http::Uri;
use thiserror::Error;

use crate::routing::table::RouteTable;

const PROXY_MARKER: &str = "/proxy/";

/// Pages answered locally, without an upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticPage {
    /// `/` and `/index.html`.
    Index,
    /// `/robots.txt`.
    Robots,
}

/// How a proxied request was matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyMode {
    /// `/proxy/<url>`; `base_url` anchors rewritten HTML links.
    Generic { base_url: String },
    /// A prefix from the [`RouteTable`].
    Mapped { prefix: String },
}

impl ProxyMode {
    pub fn is_generic(&self) -> bool {
        matches!(self, ProxyMode::Generic { .. })
    }

    /// Short label for logs.
    pub fn label(&self) -> &str {
        match self {
            ProxyMode::Generic { .. } => "generic",
            ProxyMode::Mapped { prefix } => prefix,
        }
    }
}

/// Resolved upstream destination for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub url: String,
    pub mode: ProxyMode,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Static(StaticPage),
    Proxy(ProxyTarget),
}

/// Requests that cannot be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("generic proxy path carries no target URL")]
    MalformedProxyTarget,

    #[error("no route matches the request path")]
    NotFound,
}

/// Classifies request URIs against the static pages and route table.
#[derive(Debug, Clone)]
pub struct Resolver {
    table: Arc<RouteTable>,
}

impl Resolver {
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }

    /// Decide what to do with a request URI.
    pub fn resolve(&self, uri: &Uri) -> Result<Route, RouteError> {
        let path = uri.path();
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or(path);
        self.resolve_parts(path, path_and_query)
    }

    /// Same as [`Resolver::resolve`], over the already-split URI parts.
    pub fn resolve_parts(&self, path: &str, path_and_query: &str) -> Result<Route, RouteError> {
        match path {
            "/" | "/index.html" => return Ok(Route::Static(StaticPage::Index)),
            "/robots.txt" => return Ok(Route::Static(StaticPage::Robots)),
            _ => {}
        }

        if path.starts_with(PROXY_MARKER) {
            let target = path_and_query
                .find(PROXY_MARKER)
                .map(|idx| &path_and_query[idx + PROXY_MARKER.len()..])
                .unwrap_or_default();
            if target.is_empty() {
                return Err(RouteError::MalformedProxyTarget);
            }
            return Ok(Route::Proxy(ProxyTarget {
                url: target.to_string(),
                mode: ProxyMode::Generic {
                    base_url: base_url(target),
                },
            }));
        }

        match self.table.target_for(path, path_and_query) {
            Some((entry, url)) => Ok(Route::Proxy(ProxyTarget {
                url,
                mode: ProxyMode::Mapped {
                    prefix: entry.prefix().to_string(),
                },
            })),
            None => Err(RouteError::NotFound),
        }
    }
}

/// The first three `/`-separated tokens of `target`, rejoined.
///
/// For `https://example.com/a/b` this is `https://example.com`: links are
/// always rebased on the host root, never on the page's own directory.
pub fn base_url(target: &str) -> String {
    target.splitn(4, '/').take(3).collect::<Vec<_>>().join("/")
}
