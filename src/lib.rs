//! OData service root resolution.
//!
//! Splits an escaped request URI into the escaped service root and the escaped
//! resource path, given the unescaped resource path a routing layer captured,
//! and serves that resolution over HTTP.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{resolve, split_service_root, BoundaryError, RouteMatch};
