//! Request dispatch: the per-request pipeline.
//!
//! # Data Flow
//! ```text
//! Request
//!     → Resolver (static page | generic proxy | mapped prefix | error)
//!     → [generic + OPTIONS] → 204 preflight, no upstream call
//!     → HeaderPolicy (allow-listed request headers)
//!     → UpstreamClient (one outbound call)
//!     → ResponseDecorator (CORS + security headers)
//!     → [generic + text/html] → decode → rewrite_links (buffered)
//!     → Response (streamed otherwise)
//! ```
//!
//! # Design Decisions
//! - Failures are values (`ProxyError`) turned into fixed responses here;
//!   nothing escapes to the transport layer
//! - Upstream status is forwarded unchanged
//! - Only HTML on the generic proxy is buffered

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request},
    response::{IntoResponse, Response},
};

use crate::http::encoding::{content_codings, decode, Coding};
use crate::http::error::ProxyError;
use crate::http::request::RequestIdExt;
use crate::http::response::ResponseDecorator;
use crate::http::rewrite::rewrite_links;
use crate::http::upstream::{UpstreamClient, UpstreamError};
use crate::routing::{ProxyMode, ProxyTarget, Resolver, Route, RouteTable};
use crate::security::HeaderPolicy;

/// Wires routing, header policy, upstream client and decoration together.
///
/// All members are read-only; one instance serves every request.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    resolver: Resolver,
    policy: Arc<HeaderPolicy>,
    decorator: Arc<ResponseDecorator>,
    upstream: UpstreamClient,
}

impl Dispatcher {
    pub fn new(table: Arc<RouteTable>, policy: HeaderPolicy, upstream: UpstreamClient) -> Self {
        let decorator = ResponseDecorator::new(&policy);
        Self {
            resolver: Resolver::new(table),
            policy: Arc::new(policy),
            decorator: Arc::new(decorator),
            upstream,
        }
    }

    /// Handle one request; never fails.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let request_id = request.request_id().to_string();

        match self.try_dispatch(request).await {
            Ok(response) => response,
            Err(err) => {
                if let ProxyError::UpstreamUnavailable { source, generic } = &err {
                    tracing::error!(
                        request_id = %request_id,
                        generic = *generic,
                        error = %source,
                        "Proxy request failed"
                    );
                }
                err.into_response()
            }
        }
    }

    async fn try_dispatch(&self, request: Request<Body>) -> Result<Response, ProxyError> {
        match self.resolver.resolve(request.uri())? {
            Route::Static(page) => Ok(page.into_response()),
            Route::Proxy(target) => self.forward(target, request).await,
        }
    }

    async fn forward(&self, target: ProxyTarget, request: Request<Body>) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();
        let origin = parts.headers.get(header::ORIGIN).cloned();
        let generic = target.mode.is_generic();

        if generic && parts.method == Method::OPTIONS {
            return Ok(self.decorator.preflight(&target.mode, origin.as_ref()));
        }

        tracing::debug!(
            method = %parts.method,
            route = target.mode.label(),
            target = %target.url,
            "Forwarding request"
        );

        let headers = self.policy.filter(&parts.headers);
        let unavailable = |source: UpstreamError| ProxyError::UpstreamUnavailable { generic, source };

        let upstream = self
            .upstream
            .send(parts.method, &target.url, headers, body)
            .await
            .map_err(unavailable)?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        self.decorator.decorate(&mut headers, &target.mode, origin.as_ref());

        let codings = match &target.mode {
            ProxyMode::Generic { .. } if is_html(&headers) => content_codings(&headers),
            _ => None,
        };

        let body = match (&target.mode, codings) {
            (ProxyMode::Generic { base_url }, Some(codings)) => {
                rewrite_html(upstream, &mut headers, base_url, &codings)
                    .await
                    .map_err(unavailable)?
            }
            _ => Body::from_stream(upstream.bytes_stream()),
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Buffer, decode and rewrite an HTML body.
///
/// A body that fails to decode is forwarded as received, headers untouched.
async fn rewrite_html(
    upstream: reqwest::Response,
    headers: &mut HeaderMap,
    base_url: &str,
    codings: &[Coding],
) -> Result<Body, UpstreamError> {
    let raw = upstream.bytes().await?;
    let decoded = match decode(raw.to_vec(), codings) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::warn!(error = %err, "Forwarding undecodable HTML unchanged");
            return Ok(Body::from(raw));
        }
    };

    let html = rewrite_links(&String::from_utf8_lossy(&decoded), base_url);
    headers.remove(header::CONTENT_ENCODING);
    headers.remove(header::CONTENT_LENGTH);
    Ok(Body::from(html))
}

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"))
}
