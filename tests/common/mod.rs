//! Shared utilities for integration testing.
#![allow(dead_code)]


use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_relay::config::ProxyConfig;
use api_relay::lifecycle::Shutdown;
use api_relay::{HttpServer, RouteTable};
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use flate2::{write::GzEncoder, Compression};
use tokio::net::TcpListener;

pub const HTML_PAGE: &str = concat!(
    r#"<html><head><link href="/style.css"></head><body>"#,
    r#"<a href="/foo">foo</a><img src="img.png">"#,
    r#"<a href="https://other.com/x">other</a><a href="/proxy/https://k.io/y">k</a>"#,
    r#"</body></html>"#,
);

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Handle to a running mock upstream.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.seen.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

/// Start a mock upstream on an ephemeral port.
///
/// - `/html` answers an HTML page (see [`HTML_PAGE`])
/// - `/html-gzip` answers the same page gzip-encoded
/// - `/slow` waits three seconds before answering
/// - `/cors` answers with its own CORS and security headers
/// - `/busy` answers 503
/// - anything else echoes the request body with status 200
pub async fn start_mock_upstream() -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new().fallback(record).with_state(seen.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, seen }
}

async fn record(State(seen): State<Arc<Mutex<Vec<Recorded>>>>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap().to_vec();
    let path = parts.uri.path().to_string();

    seen.lock().unwrap().push(Recorded {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        body: body.clone(),
    });

    match path.as_str() {
        "/html" => ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], HTML_PAGE).into_response(),
        "/html-gzip" => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(HTML_PAGE.as_bytes()).unwrap();
            (
                [
                    (header::CONTENT_TYPE, "text/html"),
                    (header::CONTENT_ENCODING, "gzip"),
                ],
                encoder.finish().unwrap(),
            )
                .into_response()
        }
        "/slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "late".into_response()
        }
        "/cors" => (
            StatusCode::CREATED,
            [
                ("access-control-allow-origin", "https://upstream.example"),
                ("x-frame-options", "SAMEORIGIN"),
                ("x-upstream", "kept"),
            ],
            "cors",
        )
            .into_response(),
        "/busy" => (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response(),
        _ => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            body,
        )
            .into_response(),
    }
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Handle to a running relay; shuts it down on drop.
pub struct TestRelay {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the relay on an ephemeral port with the given route table.
pub async fn start_relay(table: RouteTable, config: ProxyConfig) -> TestRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_route_table(config, table).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestRelay { addr, shutdown }
}

/// Relay whose `/openai` and `/groq` prefixes point at `upstream`.
pub async fn start_relay_for(upstream: &str) -> TestRelay {
    let table = RouteTable::new([
        ("/openai", upstream.to_string()),
        ("/groq", format!("{}/openai", upstream)),
    ])
    .unwrap();
    start_relay(table, ProxyConfig::default()).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
