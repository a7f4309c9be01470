//! Header manipulation.
//!
//! # Responsibilities
//! - Project inbound request headers onto the forwarding allow-list
//! - Advertise the same allow-list in `Access-Control-Allow-Headers`
//! - Strip hop-by-hop headers from upstream responses
//!
//! # Design Decisions
//! - Names compared case-insensitively; anything else is dropped silently
//! - Values copied byte-for-byte, never synthesized
//! - One policy value built at startup, shared read-only

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Request headers permitted to reach an upstream.
pub const ALLOWED_HEADER_NAMES: [&str; 15] = [
    "accept",
    "content-type",
    "authorization",
    "upgrade-insecure-requests",
    "user-agent",
    "sec-fetch-site",
    "sec-fetch-mode",
    "sec-fetch-dest",
    "accept-encoding",
    "accept-language",
    "cache-control",
    "pragma",
    "sec-ch-ua",
    "sec-ch-ua-mobile",
    "sec-ch-ua-platform",
];

/// Connection-scoped headers that never cross the proxy.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// The allow-listed header set and its advertised form.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    allowed: Vec<HeaderName>,
    advertised: HeaderValue,
}

impl HeaderPolicy {
    /// Build a policy from lower-case header names.
    ///
    /// # Panics
    /// If a name is not a valid lower-case header name.
    pub fn new(names: &[&'static str]) -> Self {
        let allowed = names
            .iter()
            .map(|name| HeaderName::from_static(*name))
            .collect();
        let advertised = HeaderValue::from_str(&names.join(", "))
            .unwrap_or_else(|_| HeaderValue::from_static(""));
        Self {
            allowed,
            advertised,
        }
    }

    pub fn is_allowed(&self, name: &HeaderName) -> bool {
        // HeaderName is stored lower-case, so equality is case-insensitive.
        self.allowed.contains(name)
    }

    /// Copy every allow-listed header from `inbound`, preserving repeated values.
    pub fn filter(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut outbound = HeaderMap::new();
        for (name, value) in inbound {
            if self.is_allowed(name) {
                outbound.append(name.clone(), value.clone());
            }
        }
        outbound
    }

    /// Value for `Access-Control-Allow-Headers`.
    pub fn advertised(&self) -> &HeaderValue {
        &self.advertised
    }
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self::new(&ALLOWED_HEADER_NAMES)
    }
}

/// Remove hop-by-hop headers in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_only_allowed() {
        let mut inbound = HeaderMap::new();
        inbound.insert("Authorization", HeaderValue::from_static("Bearer sk-123"));
        inbound.insert("Content-Type", HeaderValue::from_static("application/json"));
        inbound.insert("Cookie", HeaderValue::from_static("session=1"));
        inbound.insert("X-Forwarded-For", HeaderValue::from_static("10.0.0.1"));
        inbound.insert("Host", HeaderValue::from_static("relay.local"));

        let outbound = HeaderPolicy::default().filter(&inbound);

        assert_eq!(outbound.len(), 2);
        assert_eq!(outbound["authorization"], "Bearer sk-123");
        assert_eq!(outbound["content-type"], "application/json");
        assert!(outbound.get("cookie").is_none());
        assert!(outbound.get("host").is_none());
    }

    #[test]
    fn test_filter_preserves_value_bytes() {
        let mut inbound = HeaderMap::new();
        let raw = HeaderValue::from_bytes(b"Mozilla/5.0 (X11; \xe9)").unwrap();
        inbound.insert("USER-AGENT", raw.clone());

        let outbound = HeaderPolicy::default().filter(&inbound);
        assert_eq!(outbound.get("user-agent"), Some(&raw));
    }

    #[test]
    fn test_advertised_list() {
        let policy = HeaderPolicy::default();
        let advertised = policy.advertised().to_str().unwrap();
        assert!(advertised.starts_with("accept, content-type, authorization, "));
        assert!(advertised.ends_with("sec-ch-ua-mobile, sec-ch-ua-platform"));
        assert_eq!(advertised.split(", ").count(), ALLOWED_HEADER_NAMES.len());
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }
}
