//! Flight network REST service.
//!
//! Serves queries over a [`SharedGraph`](crate::snapshot::SharedGraph) that
//! can be replaced at runtime without interrupting in-flight requests.
//!
//! ## Endpoints
//!
//! - `GET /api/route?from=&to=&mode=hops|distance` - Shortest route
//! - `GET /api/paths?from=&to=&max_hops=&limit=` - Bounded simple paths
//! - `GET /api/hubs?top=` - Centrality and route-count rankings
//! - `GET /api/metrics` - Density, average degree, diameter
//! - `GET /api/graph` - Node-link export
//! - `PUT /api/graph` - Import a node-link document and swap it in
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{record_query_metrics, request_logging_middleware};
pub use routes::{create_router, AppState, ErrorResponse, RouteMode};
pub use state::{LogFormat, ServiceConfig, ServiceState};
