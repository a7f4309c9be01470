//! Response handling and transformation.
//!
//! # Responsibilities
//! - Render the locally answered pages (index, robots)
//! - Overlay CORS and security headers on upstream response headers
//! - Build the preflight (204) answer for the generic proxy
//!
//! # Design Decisions
//! - Upstream headers are the base; the relay's values always win
//! - Generic proxy echoes the caller's `Origin`; mapped routes allow `*`
//! - Hop-by-hop headers are stripped before decoration

use axum::{
    body::Body,
    http::{
        header::{self, HeaderMap, HeaderName, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
};

use crate::routing::{ProxyMode, StaticPage};
use crate::security::headers::{strip_hop_by_hop, HeaderPolicy};

const INDEX_BODY: &str = "Service is running!";
const ROBOTS_BODY: &str = "User-agent: *\nDisallow: /";

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS, HEAD, PATCH";
const MAX_AGE: &str = "86400";

impl IntoResponse for StaticPage {
    fn into_response(self) -> Response {
        let (content_type, body) = match self {
            StaticPage::Index => ("text/html", INDEX_BODY),
            StaticPage::Robots => ("text/plain", ROBOTS_BODY),
        };
        (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
    }
}

/// Applies the relay's CORS and security headers.
#[derive(Debug, Clone)]
pub struct ResponseDecorator {
    allow_headers: HeaderValue,
}

impl ResponseDecorator {
    pub fn new(policy: &HeaderPolicy) -> Self {
        Self {
            allow_headers: policy.advertised().clone(),
        }
    }

    /// Decorate `headers` (usually copied from the upstream) in place.
    pub fn decorate(&self, headers: &mut HeaderMap, mode: &ProxyMode, origin: Option<&HeaderValue>) {
        strip_hop_by_hop(headers);

        headers.insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

        match (mode, origin) {
            (ProxyMode::Mapped { .. }, _) => {
                headers.insert(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                );
            }
            (ProxyMode::Generic { .. }, Some(origin)) => {
                headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            }
            (ProxyMode::Generic { .. }, None) => {
                headers.remove(header::ACCESS_CONTROL_ALLOW_ORIGIN);
            }
        }

        let cors: [(HeaderName, HeaderValue); 4] = [
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOW_METHODS),
            ),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone()),
            (
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            ),
            (header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE)),
        ];
        for (name, value) in cors {
            headers.insert(name, value);
        }
    }

    /// 204 answer to an `OPTIONS` on the generic proxy; no upstream involved.
    pub fn preflight(&self, mode: &ProxyMode, origin: Option<&HeaderValue>) -> Response {
        let mut headers = HeaderMap::new();
        self.decorate(&mut headers, mode, origin);

        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        *response.headers_mut() = headers;
        response
    }
}

impl Default for ResponseDecorator {
    fn default() -> Self {
        Self::new(&HeaderPolicy::default())
    }
}
