//! Request-level failure taxonomy.
//!
//! Every failure is converted into a fixed-shape response at the dispatcher
//! boundary. The upstream cause is kept as a `source` for server-side logs and
//! never rendered to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::upstream::UpstreamError;
use crate::routing::RouteError;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// `/proxy/` with nothing after it.
    #[error("invalid proxy URL")]
    MalformedProxyTarget,

    #[error("route not found")]
    RouteNotFound,

    /// Network, DNS, TLS or deadline failure talking to the upstream.
    #[error("upstream unavailable")]
    UpstreamUnavailable {
        generic: bool,
        #[source]
        source: UpstreamError,
    },
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MalformedProxyTarget => StatusCode::BAD_REQUEST,
            ProxyError::RouteNotFound => StatusCode::NOT_FOUND,
            ProxyError::UpstreamUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body text shown to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::MalformedProxyTarget => "Invalid proxy URL",
            ProxyError::RouteNotFound => "Not Found",
            ProxyError::UpstreamUnavailable { generic: true, .. } => "Proxy Request Failed",
            ProxyError::UpstreamUnavailable { generic: false, .. } => "Internal Server Error",
        }
    }
}

impl From<RouteError> for ProxyError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::MalformedProxyTarget => ProxyError::MalformedProxyTarget,
            RouteError::NotFound => ProxyError::RouteNotFound,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_route_errors_map_to_status() {
        let bad = ProxyError::from(RouteError::MalformedProxyTarget);
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(bad.public_message(), "Invalid proxy URL");

        let missing = ProxyError::from(RouteError::NotFound);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.public_message(), "Not Found");
    }

    #[test]
    fn test_upstream_detail_not_exposed() {
        let err = ProxyError::UpstreamUnavailable {
            generic: false,
            source: UpstreamError::Deadline(Duration::from_secs(7)),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal Server Error");

        let generic = ProxyError::UpstreamUnavailable {
            generic: true,
            source: UpstreamError::Deadline(Duration::from_secs(7)),
        };
        assert_eq!(generic.public_message(), "Proxy Request Failed");
    }
}
