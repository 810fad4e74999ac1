//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the resolution handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Dispatch requests to the routing engine
//! - Swap the route table on configuration updates

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::http::request::{request_id, UuidRequestId};
use crate::lifecycle::wait_for_shutdown;
use crate::observability::metrics;
use crate::routing::{RouteMatch, Router as ODataRouter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<ArcSwap<ODataRouter>>,
}

/// HTTP server resolving OData service roots.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    routes: Arc<ArcSwap<ODataRouter>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RouterConfig) -> Self {
        let routes = Arc::new(ArcSwap::from_pointee(ODataRouter::from_config(
            config.routes.clone(),
            &config.path_handler,
        )));

        let state = AppState {
            routes: routes.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            routes,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id(req),
                )
            }))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id());

        Router::new()
            .route("/{*path}", any(resolve_handler))
            .route("/", any(resolve_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// The Axum router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C or a shutdown broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.load().len(),
            "HTTP server starting"
        );

        let routes = self.routes.clone();
        let reload = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                let next = ODataRouter::from_config(config.routes, &config.path_handler);
                tracing::info!(routes = next.len(), "Route table reloaded");
                routes.store(Arc::new(next));
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        reload.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Resolves the request against the current route table.
async fn resolve_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let routes = state.routes.load();

    let result = routes.match_request(&request);
    match &result {
        RouteMatch::Matched(ctx) => {
            tracing::debug!(
                request_id = %request_id(&request),
                route = %ctx.route_name,
                service_root = %ctx.service_root,
                path_and_query = %ctx.path_and_query,
                "Resolved OData request"
            );
            metrics::record_match(&ctx.route_name, start);
        }
        RouteMatch::NotMatched => {
            tracing::warn!(
                request_id = %request_id(&request),
                path = %request.uri().path(),
                "No route matched"
            );
            metrics::record_miss(start);
        }
    }

    result.into_response()
}
