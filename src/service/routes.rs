//! Axum routes for the flight network service.

use axum::{
    body::Bytes,
    extract::{Json, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::builder::BuildReport;
use crate::metrics::{busiest_airports, graph_metrics, top_hubs, AirportDegree, GraphMetrics, HubScore};
use crate::paths::{all_simple_paths, shortest_path_by_distance, shortest_path_by_hops, RouteSummary};
use crate::snapshot::GraphVersion;
use crate::store::{node_link, GraphStore, JsonFileStore, NodeLinkDocument};
use crate::FLIGHT_NETWORK_SCHEMA_VERSION;

use super::middleware::record_query_metrics;
use super::state::ServiceState;

/// Type alias for the service state backed by a JSON file.
pub type AppState = ServiceState<JsonFileStore>;

/// Default number of hubs returned by `/api/hubs`.
pub const DEFAULT_TOP_HUBS: usize = 10;

/// Default hop bound for `/api/paths`.
pub const DEFAULT_MAX_HOPS: usize = 3;

/// Default number of paths returned by `/api/paths`.
pub const DEFAULT_PATH_LIMIT: usize = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Which shortest path to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// Fewest hops, then shortest distance.
    #[default]
    Hops,
    /// Shortest distance.
    Distance,
}

impl std::str::FromStr for RouteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hops" => Ok(Self::Hops),
            "distance" => Ok(Self::Distance),
            other => Err(format!("unknown mode '{}', expected hops or distance", other)),
        }
    }
}

/// Query for `/api/route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteQuery {
    /// Origin airport code.
    pub from: String,
    /// Destination airport code.
    pub to: String,
    /// `hops` (default) or `distance`.
    pub mode: Option<String>,
}

/// Shortest route response. `route` is null when the destination is unreachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Mode used.
    pub mode: RouteMode,
    /// The route, if one exists.
    pub route: Option<RouteSummary>,
    /// Graph the route was computed on.
    pub snapshot_id: String,
}

/// Query for `/api/paths`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsQuery {
    /// Origin airport code.
    pub from: String,
    /// Destination airport code.
    pub to: String,
    /// Maximum routes per path.
    pub max_hops: Option<usize>,
    /// Maximum number of paths returned.
    pub limit: Option<usize>,
}

/// Simple paths response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsResponse {
    /// Paths in enumeration order.
    pub paths: Vec<RouteSummary>,
    /// Whether enumeration stopped at `limit`.
    pub truncated: bool,
    /// Hop bound applied.
    pub max_hops: usize,
    /// Graph the paths were computed on.
    pub snapshot_id: String,
}

/// Query for `/api/hubs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubsQuery {
    /// Number of airports per ranking.
    pub top: Option<usize>,
}

/// Hub rankings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubsResponse {
    /// Highest betweenness centrality first.
    pub hubs: Vec<HubScore>,
    /// Most routes first.
    pub busiest: Vec<AirportDegree>,
    /// Graph the rankings were computed on.
    pub snapshot_id: String,
}

/// Graph metrics response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    /// The metrics.
    #[serde(flatten)]
    pub metrics: GraphMetrics,
    /// Graph the metrics were computed on.
    pub snapshot_id: String,
}

/// Result of replacing the served graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReplaceResponse {
    /// Snapshot now being served.
    pub snapshot_id: String,
    /// Snapshot that was replaced.
    pub previous_snapshot_id: String,
    /// Airports in the new graph.
    pub airports: usize,
    /// Routes in the new graph.
    pub routes: usize,
    /// What the import skipped.
    pub report: BuildReport,
    /// Whether the graph was written to the backing store.
    pub persisted: bool,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schema_version: String,
    pub snapshot_id: String,
    pub airports: usize,
    pub routes: usize,
    pub uptime_secs: u64,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn unknown_airport(code: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("UNKNOWN_AIRPORT", "Airport is not in the served graph").with_details(code)),
    )
}

fn bad_request(code: &str, error: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(code, error)))
}

fn invalid_document(details: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("INVALID_DOCUMENT", "Invalid node-link document").with_details(details)),
    )
}

fn internal(code: &str, error: impl Into<String>) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(code, error)))
}

fn require_airports(version: &GraphVersion, codes: [&str; 2]) -> Result<(), ApiError> {
    match codes.into_iter().find(|c| !version.graph.contains(c)) {
        Some(missing) => Err(unknown_airport(missing)),
        None => Ok(()),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Shortest route between two airports.
async fn route_handler<S: GraphStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let mode = match query.mode.as_deref() {
        Some(raw) => raw
            .parse::<RouteMode>()
            .map_err(|e| bad_request("INVALID_MODE", e))?,
        None => RouteMode::default(),
    };

    let version = state.graph.current();
    require_airports(&version, [query.from.as_str(), query.to.as_str()])?;

    let start = Instant::now();
    let path = match mode {
        RouteMode::Hops => shortest_path_by_hops(&version.graph, &query.from, &query.to),
        RouteMode::Distance => shortest_path_by_distance(&version.graph, &query.from, &query.to),
    };
    let route = path.and_then(|p| RouteSummary::from_path(&version.graph, p));
    record_query_metrics("route", route.is_some() as usize, start.elapsed().as_millis() as u64);

    Ok(Json(RouteResponse {
        mode,
        route,
        snapshot_id: version.snapshot.snapshot_id.clone(),
    }))
}

/// Enumerate bounded simple paths.
async fn paths_handler<S: GraphStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Query(query): Query<PathsQuery>,
) -> Result<Json<PathsResponse>, ApiError> {
    let version = state.graph.current();
    require_airports(&version, [query.from.as_str(), query.to.as_str()])?;

    let max_hops = query.max_hops.unwrap_or(DEFAULT_MAX_HOPS);
    let limit = query.limit.unwrap_or(DEFAULT_PATH_LIMIT);

    let start = Instant::now();
    let response = tokio::task::spawn_blocking(move || {
        let graph = &version.graph;
        let mut found = all_simple_paths(graph, &query.from, &query.to, Some(max_hops))
            .filter_map(|p| RouteSummary::from_path(graph, p));
        let paths: Vec<RouteSummary> = found.by_ref().take(limit).collect();
        let truncated = found.next().is_some();

        PathsResponse {
            paths,
            truncated,
            max_hops,
            snapshot_id: version.snapshot.snapshot_id.clone(),
        }
    })
    .await
    .map_err(|e| internal("PATHS_FAILED", e.to_string()))?;

    record_query_metrics("paths", response.paths.len(), start.elapsed().as_millis() as u64);
    Ok(Json(response))
}

/// Hub rankings by centrality and by route count.
async fn hubs_handler<S: GraphStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Query(query): Query<HubsQuery>,
) -> Result<Json<HubsResponse>, ApiError> {
    let top = query.top.unwrap_or(DEFAULT_TOP_HUBS);
    let version = state.graph.current();

    let start = Instant::now();
    let response = tokio::task::spawn_blocking(move || {
        let centrality = version.centrality();
        HubsResponse {
            hubs: top_hubs(&centrality, top),
            busiest: busiest_airports(&version.graph, top),
            snapshot_id: version.snapshot.snapshot_id.clone(),
        }
    })
    .await
    .map_err(|e| internal("HUBS_FAILED", e.to_string()))?;

    record_query_metrics("hubs", response.hubs.len(), start.elapsed().as_millis() as u64);
    Ok(Json(response))
}

/// Density, average degree and diameter.
async fn metrics_handler<S: GraphStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let version = state.graph.current();

    let start = Instant::now();
    let response = tokio::task::spawn_blocking(move || MetricsResponse {
        metrics: graph_metrics(&version.graph),
        snapshot_id: version.snapshot.snapshot_id.clone(),
    })
    .await
    .map_err(|e| internal("METRICS_FAILED", e.to_string()))?;

    record_query_metrics("metrics", response.metrics.airports, start.elapsed().as_millis() as u64);
    Ok(Json(response))
}

/// Export the served graph as a node-link document.
async fn export_handler<S: GraphStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Json<NodeLinkDocument> {
    Json(node_link::export(&state.graph.current().graph))
}

/// Import a node-link document and swap it in.
///
/// The document is persisted before the swap so a failed write leaves the
/// served graph untouched. Replacements run one at a time.
async fn replace_handler<S: GraphStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    body: Bytes,
) -> Result<Json<GraphReplaceResponse>, ApiError> {
    let document: NodeLinkDocument =
        serde_json::from_slice(&body).map_err(|e| invalid_document(e.to_string()))?;
    let (graph, report) =
        node_link::import_with_report(document).map_err(|e| invalid_document(e.to_string()))?;

    let _guard = state.replace_lock.lock().await;

    let store = state.store.clone();
    let shared = Arc::clone(&state.graph);
    let (previous, current, persisted) = tokio::task::spawn_blocking(move || {
        let persisted = match store {
            Some(store) => {
                store.save(&graph).map_err(|e| internal("PERSIST_FAILED", e.to_string()))?;
                true
            }
            None => false,
        };
        let previous = shared.replace(graph);
        Ok::<_, ApiError>((previous, shared.current(), persisted))
    })
    .await
    .map_err(|e| internal("PERSIST_FAILED", e.to_string()))??;

    Ok(Json(GraphReplaceResponse {
        snapshot_id: current.snapshot.snapshot_id.clone(),
        previous_snapshot_id: previous.snapshot.snapshot_id.clone(),
        airports: current.graph.num_airports(),
        routes: current.graph.num_routes(),
        report,
        persisted,
    }))
}

/// Health check endpoint (detailed).
async fn health_handler<S: GraphStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Json<HealthResponse> {
    let version = state.graph.current();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: FLIGHT_NETWORK_SCHEMA_VERSION.to_string(),
        snapshot_id: version.snapshot.snapshot_id.clone(),
        airports: version.graph.num_airports(),
        routes: version.graph.num_routes(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Liveness probe endpoint.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the flight network service.
pub fn create_router<S: GraphStore + 'static>(state: ServiceState<S>) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Queries
        .route("/api/route", get(route_handler::<S>))
        .route("/api/paths", get(paths_handler::<S>))
        .route("/api/hubs", get(hubs_handler::<S>))
        .route("/api/metrics", get(metrics_handler::<S>))
        // Graph interchange
        .route("/api/graph", get(export_handler::<S>).put(replace_handler::<S>))
        // Health checks
        .route("/health", get(health_handler::<S>))
        .route("/health/live", get(liveness_handler))
        .with_state(state)
}
