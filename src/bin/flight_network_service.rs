//! Flight Network Service Binary
//!
//! Runs the flight network query API:
//! - Structured JSON logging
//! - Request logging with request ids
//! - Graceful shutdown handling
//! - Health check endpoints
//!
//! ## Configuration
//!
//! Environment variables:
//! - `GRAPH_PATH`: node-link JSON file loaded at start-up and rewritten on `PUT /api/graph`
//! - `PORT`: Service port (default: 8002)
//! - `HOST`: Service host (default: 0.0.0.0)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! GRAPH_PATH=flight_network.json cargo run --bin flight_network_service --features service
//! ```

use std::time::Instant;

use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use flight_network_kernel::service::{
    create_router, request_logging_middleware, AppState, LogFormat, ServiceConfig, ServiceState,
};
use flight_network_kernel::{FlightGraph, GraphStore, JsonFileStore};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flight_network_service=info,flight_network_kernel=info,tower_http=info".into());

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_span_events(FmtSpan::CLOSE))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_current_span(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .flatten_event(true),
                )
                .init();
        }
    }
}

/// Load the graph named by `GRAPH_PATH`, or start empty.
fn initial_state(config: &ServiceConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let Some(path) = config.graph_path.as_ref() else {
        warn!("GRAPH_PATH not set, serving an empty graph without persistence");
        return Ok(ServiceState::new(FlightGraph::new()));
    };

    let load_start = Instant::now();
    let store = JsonFileStore::new(path);
    let graph = match store.load()? {
        Some(graph) => graph,
        None => {
            warn!(path = %path.display(), "graph file not found, starting empty");
            FlightGraph::new()
        }
    };

    info!(
        path = %path.display(),
        airports = graph.num_airports(),
        routes = graph.num_routes(),
        latency_ms = load_start.elapsed().as_millis() as u64,
        "flight graph loaded"
    );

    Ok(ServiceState::with_store(graph, store))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env();
    init_tracing(config.log_format);

    let version = env!("CARGO_PKG_VERSION");
    info!(version = version, "Starting Flight Network Service");

    let state = initial_state(&config)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.bind_addr()?;
    info!(address = %addr, version = version, "Flight Network Service listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Flight Network Service shutdown complete");
    Ok(())
}
