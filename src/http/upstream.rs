//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Issue the single outbound request for a proxied call
//! - Stream the inbound body upstream without buffering it
//! - Bound connect + response headers with the configured deadline
//!
//! # Design Decisions
//! - TLS via rustls; system proxy variables are ignored
//! - No retries
//! - Redirects are followed by the client

use std::time::Duration;

use axum::{
    body::{Body, HttpBody},
    http::{HeaderMap, Method},
};
use thiserror::Error;

use crate::config::TimeoutConfig;
use crate::resilience::with_deadline;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no upstream response within {0:?}")]
    Deadline(Duration),
}

/// Shared outbound client; cheap to clone.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    deadline: Duration,
}

impl UpstreamClient {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            deadline: Duration::from_secs(timeouts.upstream_secs),
        })
    }

    /// Send one request and wait for the response head.
    ///
    /// The returned response body has not been read yet.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Body,
    ) -> Result<reqwest::Response, UpstreamError> {
        let mut request = self.client.request(method, url).headers(headers);

        // An empty inbound body is not sent at all, so GET/HEAD stay bodiless.
        if body.size_hint().exact() != Some(0) {
            request = request.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let response = with_deadline(self.deadline, request.send())
            .await
            .map_err(|elapsed| UpstreamError::Deadline(elapsed.0))??;
        Ok(response)
    }
}
