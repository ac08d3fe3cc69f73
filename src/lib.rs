//! # flight-network-kernel
//!
//! Directed flight-network graphs built from airport and route tables.
//!
//! Airports are nodes keyed by code; routes are directed edges weighted by
//! great-circle distance in kilometers.
//!
//! ## Architecture
//!
//! ```text
//! CSV tables → GraphBuilder → FlightGraph → paths / metrics
//!                                  ↓
//!                     GraphStore (node-link JSON file or memory)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Airports are indexed in code order, routes in (origin, destination) order
//! - Shortest-path ties resolve to the lexicographically smallest successor
//! - The same records in any order yield the same snapshot_id

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod geo;
pub mod graph;
pub mod builder;
pub mod paths;
pub mod metrics;
pub mod canonical;
pub mod snapshot;
pub mod store;
pub mod tables;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{Airport, AirportCode, AirportRecord, AirportRejection, RouteEdge, RouteRecord, RouteRejection};
pub use geo::{distance_km, EARTH_RADIUS_KM};
pub use graph::{FlightGraph, GraphView, NodeIndex};
pub use builder::{BuildReport, GraphBuilder, SkippedAirport, SkippedRoute};
pub use paths::{
    all_simple_paths, route_distance, shortest_path_by_distance, shortest_path_by_hops,
    RouteSummary, SimplePaths,
};
pub use metrics::{
    betweenness_centrality, busiest_airports, graph_metrics, top_hubs,
    AirportDegree, GraphMetrics, HubScore,
};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use snapshot::{CentralityScores, GraphSnapshot, GraphVersion, SharedGraph};
pub use store::{GraphStore, InMemoryGraphStore, JsonFileStore, NodeLinkDocument, StoreError};
pub use tables::{read_airports, read_routes, TableError};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceConfig, ServiceState};

/// Schema version for exported graph documents and snapshots.
/// Increment on breaking changes to any schema type.
pub const FLIGHT_NETWORK_SCHEMA_VERSION: &str = "1.0.0";
