//! Shared utilities for integration tests.

use std::net::SocketAddr;

use odata_router::config::{RouteConfig, RouterConfig};
use odata_router::http::HttpServer;
use odata_router::lifecycle::Shutdown;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A router running on an ephemeral port.
pub struct RunningRouter {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<RouterConfig>,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningRouter {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub fn route(name: &str, prefix: &str, priority: u32) -> RouteConfig {
    RouteConfig {
        name: name.into(),
        route_prefix: prefix.into(),
        host: None,
        priority,
    }
}

/// Start the router with `routes` on 127.0.0.1 and an OS-assigned port.
pub async fn spawn_router(routes: Vec<RouteConfig>) -> RunningRouter {
    let mut config = RouterConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.routes = routes;

    let listener = tokio::net::TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, config_updates, server_shutdown).await });

    RunningRouter {
        addr,
        shutdown,
        updates,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
