//! Graph snapshot identity and the shared, swappable graph handle.
//!
//! A `GraphSnapshot` fingerprints a built graph so exported documents and
//! service responses can say which network they were computed against.
//! `SharedGraph` lets readers query one immutable graph while a rebuilt one
//! is swapped in atomically.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::info;

use crate::canonical::canonical_hash_hex;
use crate::graph::FlightGraph;
use crate::metrics::betweenness_centrality;
use crate::types::AirportCode;
use crate::FLIGHT_NETWORK_SCHEMA_VERSION;

/// A deterministic fingerprint of a built graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// xxh64 over all components below.
    pub snapshot_id: String,
    /// Number of airports.
    pub airport_count: u64,
    /// Number of routes.
    pub route_count: u64,
    /// Schema version used for types.
    pub schema_version: String,
    /// Hash of (code, lat, lon) for every airport, in code order.
    pub airport_hash: String,
    /// Hash of (origin, destination) for every route, in pair order.
    pub route_hash: String,
    /// Unix timestamp when this snapshot was computed.
    pub computed_at: i64,
}

#[derive(Serialize)]
struct SnapshotIdInput<'a> {
    airport_count: u64,
    route_count: u64,
    schema_version: &'a str,
    airport_hash: &'a str,
    route_hash: &'a str,
}

impl GraphSnapshot {
    /// Fingerprint a graph.
    ///
    /// Airports and routes are already held in sorted order, so two graphs
    /// built from the same records in any order share a `snapshot_id`.
    pub fn compute(graph: &FlightGraph) -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        let airports: Vec<(&str, f64, f64)> = graph
            .airports()
            .iter()
            .map(|a| (a.code.as_str(), a.lat, a.lon))
            .collect();
        let airport_hash = canonical_hash_hex(&airports);

        let routes: Vec<(&str, &str)> = graph
            .routes()
            .iter()
            .map(|r| (r.origin.as_str(), r.destination.as_str()))
            .collect();
        let route_hash = canonical_hash_hex(&routes);

        let airport_count = graph.num_airports() as u64;
        let route_count = graph.num_routes() as u64;
        let snapshot_id = canonical_hash_hex(&SnapshotIdInput {
            airport_count,
            route_count,
            schema_version: FLIGHT_NETWORK_SCHEMA_VERSION,
            airport_hash: &airport_hash,
            route_hash: &route_hash,
        });

        Self {
            snapshot_id,
            airport_count,
            route_count,
            schema_version: FLIGHT_NETWORK_SCHEMA_VERSION.to_string(),
            airport_hash,
            route_hash,
            computed_at: now,
        }
    }

    /// Whether this snapshot describes `graph`.
    pub fn verify(&self, graph: &FlightGraph) -> bool {
        Self::compute(graph).snapshot_id == self.snapshot_id
    }
}

/// Centrality scores keyed by airport.
pub type CentralityScores = BTreeMap<AirportCode, f64>;

/// One immutable graph together with its fingerprint.
#[derive(Debug)]
pub struct GraphVersion {
    /// The graph.
    pub graph: FlightGraph,
    /// Its fingerprint.
    pub snapshot: GraphSnapshot,
    centrality: OnceLock<Arc<CentralityScores>>,
}

impl GraphVersion {
    /// Fingerprint and wrap a graph.
    pub fn new(graph: FlightGraph) -> Self {
        let snapshot = GraphSnapshot::compute(&graph);
        Self {
            graph,
            snapshot,
            centrality: OnceLock::new(),
        }
    }

    /// Betweenness centrality of this graph, computed on first use.
    ///
    /// Concurrent callers on the same version wait for one computation;
    /// other versions are unaffected.
    pub fn centrality(&self) -> Arc<CentralityScores> {
        let scores = self.centrality.get_or_init(|| {
            let start = std::time::Instant::now();
            let scores = Arc::new(betweenness_centrality(&self.graph));
            info!(
                snapshot_id = %self.snapshot.snapshot_id,
                latency_ms = start.elapsed().as_millis() as u64,
                "betweenness centrality computed"
            );
            scores
        });
        Arc::clone(scores)
    }
}

/// Read handle over the current graph with atomic replacement.
///
/// Readers take an `Arc<GraphVersion>` and keep querying it even if a new
/// graph is swapped in meanwhile; nothing is ever mutated in place.
/// Betweenness centrality is cached on each [`GraphVersion`].
#[derive(Debug)]
pub struct SharedGraph {
    current: RwLock<Arc<GraphVersion>>,
}

impl SharedGraph {
    /// Wrap an initial graph.
    pub fn new(graph: FlightGraph) -> Self {
        Self {
            current: RwLock::new(Arc::new(GraphVersion::new(graph))),
        }
    }

    /// The graph readers should use now.
    pub fn current(&self) -> Arc<GraphVersion> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a freshly built graph, returning the previous version.
    pub fn replace(&self, graph: FlightGraph) -> Arc<GraphVersion> {
        let next = Arc::new(GraphVersion::new(graph));
        info!(
            snapshot_id = %next.snapshot.snapshot_id,
            airports = next.snapshot.airport_count,
            routes = next.snapshot.route_count,
            "swapping in rebuilt flight graph"
        );
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Betweenness centrality of the current graph.
    ///
    /// Callers that also read other fields should take [`current`](Self::current)
    /// once and use [`GraphVersion::centrality`] on it.
    pub fn centrality(&self) -> Arc<CentralityScores> {
        self.current().centrality()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::types::{AirportRecord, RouteRecord};

    fn airports() -> Vec<AirportRecord> {
        vec![
            AirportRecord::new("HAN", 21.0, 105.8),
            AirportRecord::new("SGN", 10.8, 106.7),
            AirportRecord::new("DAD", 16.0, 108.2),
        ]
    }

    #[test]
    fn test_snapshot_order_independence() {
        let g1 = GraphBuilder::build(
            airports(),
            vec![RouteRecord::new("HAN", "SGN"), RouteRecord::new("HAN", "DAD")],
        );
        let mut reversed = airports();
        reversed.reverse();
        let g2 = GraphBuilder::build(
            reversed,
            vec![RouteRecord::new("HAN", "DAD"), RouteRecord::new("HAN", "SGN")],
        );

        let s1 = GraphSnapshot::compute(&g1);
        let s2 = GraphSnapshot::compute(&g2);
        assert_eq!(s1.snapshot_id, s2.snapshot_id);
        assert_eq!(s1.airport_count, 3);
        assert_eq!(s1.route_count, 2);
    }

    #[test]
    fn test_snapshot_differs_on_change() {
        let g1 = GraphBuilder::build(airports(), vec![RouteRecord::new("HAN", "SGN")]);
        let g2 = GraphBuilder::build(airports(), vec![RouteRecord::new("SGN", "HAN")]);

        let s1 = GraphSnapshot::compute(&g1);
        assert!(s1.verify(&g1));
        assert!(!s1.verify(&g2));
    }

    #[test]
    fn test_shared_graph_swap_keeps_old_readers() {
        let shared = SharedGraph::new(GraphBuilder::build(airports(), Vec::<RouteRecord>::new()));
        let before = shared.current();

        let rebuilt = GraphBuilder::build(airports(), vec![RouteRecord::new("HAN", "SGN")]);
        let previous = shared.replace(rebuilt);

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.graph.num_routes(), 0);
        assert_eq!(shared.current().graph.num_routes(), 1);
    }

    #[test]
    fn test_centrality_cache_follows_swaps() {
        let shared = SharedGraph::new(GraphBuilder::build(airports(), Vec::<RouteRecord>::new()));
        let first = shared.centrality();
        assert!(Arc::ptr_eq(&first, &shared.centrality()));
        assert!(first.values().all(|&v| v == 0.0));

        shared.replace(GraphBuilder::build(
            airports(),
            vec![RouteRecord::new("HAN", "DAD"), RouteRecord::new("DAD", "SGN")],
        ));
        let second = shared.centrality();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second["DAD"] > 0.0);
    }

    fn grid(side: usize) -> FlightGraph {
        let code = |r: usize, c: usize| format!("G{:02}{:02}", r, c);
        let mut airports = Vec::new();
        let mut routes = Vec::new();
        for r in 0..side {
            for c in 0..side {
                airports.push(AirportRecord::new(&code(r, c), r as f64 * 0.5, c as f64 * 0.5));
                if c + 1 < side {
                    routes.push(RouteRecord::new(&code(r, c), &code(r, c + 1)));
                    routes.push(RouteRecord::new(&code(r, c + 1), &code(r, c)));
                }
                if r + 1 < side {
                    routes.push(RouteRecord::new(&code(r, c), &code(r + 1, c)));
                    routes.push(RouteRecord::new(&code(r + 1, c), &code(r, c)));
                }
            }
        }
        GraphBuilder::build(airports, routes)
    }

    #[test]
    fn test_centrality_stays_with_its_version() {
        let shared = SharedGraph::new(GraphBuilder::build(
            airports(),
            vec![RouteRecord::new("HAN", "DAD"), RouteRecord::new("DAD", "SGN")],
        ));
        let old = shared.current();

        shared.replace(GraphBuilder::build(
            vec![AirportRecord::new("LHR", 51.47, -0.45)],
            Vec::<RouteRecord>::new(),
        ));

        let scores = old.centrality();
        assert_eq!(scores.len(), 3);
        assert!(scores["DAD"] > 0.0);
        assert_eq!(shared.centrality().len(), 1);
    }

    #[test]
    fn test_replace_does_not_wait_for_centrality() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::time::{Duration, Instant};

        let shared = Arc::new(SharedGraph::new(grid(40)));
        let started = Arc::new(AtomicBool::new(false));

        let worker = {
            let shared = Arc::clone(&shared);
            let started = Arc::clone(&started);
            std::thread::spawn(move || {
                let version = shared.current();
                started.store(true, Ordering::SeqCst);
                let start = Instant::now();
                let scores = version.centrality();
                (scores.len(), start.elapsed())
            })
        };

        while !started.load(Ordering::SeqCst) {
            std::thread::yield_now();
        }
        std::thread::sleep(Duration::from_millis(10));

        let start = Instant::now();
        let previous = shared.replace(FlightGraph::new());
        let replace_took = start.elapsed();

        let (scored, centrality_took) = worker.join().unwrap();
        assert_eq!(previous.graph.num_airports(), 1600);
        assert_eq!(scored, 1600);
        assert!(shared.current().graph.is_empty());
        assert!(
            replace_took < centrality_took,
            "replace took {:?}, centrality took {:?}",
            replace_took,
            centrality_took
        );
    }
}
