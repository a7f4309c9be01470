//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router sending every path and method to the dispatcher
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve on a bound listener until shutdown

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::dispatch::Dispatcher;
use crate::http::request::{request_id_layer, RequestIdExt};
use crate::http::upstream::UpstreamClient;
use crate::lifecycle::shutdown::ShutdownListener;
use crate::lifecycle::signals::shutdown_signal;
use crate::routing::RouteTable;
use crate::security::HeaderPolicy;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("server IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server using the built-in route table.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        Self::with_route_table(config, RouteTable::builtin())
    }

    /// Create a server forwarding mapped prefixes through `table`.
    pub fn with_route_table(config: ProxyConfig, table: RouteTable) -> Result<Self, ServerError> {
        let upstream = UpstreamClient::new(&config.timeouts)?;
        let dispatcher = Dispatcher::new(Arc::new(table), HeaderPolicy::default(), upstream);

        let state = AppState {
            dispatcher: Arc::new(dispatcher),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request.request_id(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns after `shutdown` fires or SIGINT/SIGTERM is received and
    /// in-flight requests have drained.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownListener,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                    _ = shutdown_signal() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    tracing::debug!(
        peer = %peer,
        path = %request.uri().path(),
        "Accepted request"
    );
    state.dispatcher.dispatch(request).await
}
