//! In-memory directed flight graph.
//!
//! The graph is immutable once built. Nodes are stored in code order and
//! addressed by dense indices; algorithms work on indices through the
//! [`GraphView`] trait and translate back to [`AirportCode`]s at the edge
//! of the public API.

use std::collections::BTreeMap;

use crate::types::{Airport, AirportCode, RouteEdge};

/// Dense node index into a graph.
pub type NodeIndex = usize;

/// An outgoing adjacency entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjacent {
    /// Target node.
    pub target: NodeIndex,
    /// Edge weight (km).
    pub weight: f64,
    /// Position of the edge in [`FlightGraph::routes`].
    pub route: usize,
}

/// Read-only view used by the path and metric algorithms.
///
/// Any adjacency structure that can answer these four questions can be
/// analysed; [`FlightGraph`] is the only implementation in this crate.
pub trait GraphView {
    /// Number of nodes. Valid indices are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Number of directed edges.
    fn edge_count(&self) -> usize;

    /// Outgoing edges of `node`, ordered by target index.
    fn successors(&self, node: NodeIndex) -> &[Adjacent];

    /// Nodes with an edge into `node`, in ascending order.
    fn predecessors(&self, node: NodeIndex) -> &[NodeIndex];

    /// Weight of the edge `from -> to`, if it exists.
    fn weight(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        let out = self.successors(from);
        out.binary_search_by(|a| a.target.cmp(&to))
            .ok()
            .map(|i| out[i].weight)
    }
}

/// Directed flight-route graph.
///
/// Invariants:
/// - every edge's endpoints are nodes
/// - edge weights are the haversine distance between endpoint coordinates
/// - at most one edge per ordered (origin, destination) pair
#[derive(Debug, Clone, Default)]
pub struct FlightGraph {
    airports: Vec<Airport>,
    index: BTreeMap<AirportCode, NodeIndex>,
    out_adj: Vec<Vec<Adjacent>>,
    in_adj: Vec<Vec<NodeIndex>>,
    routes: Vec<RouteEdge>,
}

impl FlightGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a graph from validated parts.
    ///
    /// `airports` must be sorted by code and unique; every route must
    /// reference airports in the list. Both hold for the builder's output.
    pub(crate) fn from_parts(airports: Vec<Airport>, mut routes: Vec<RouteEdge>) -> Self {
        let index: BTreeMap<AirportCode, NodeIndex> = airports
            .iter()
            .enumerate()
            .map(|(i, a)| (a.code.clone(), i))
            .collect();

        routes.sort_by(|a, b| {
            a.origin
                .cmp(&b.origin)
                .then_with(|| a.destination.cmp(&b.destination))
        });

        let n = airports.len();
        let mut out_adj: Vec<Vec<Adjacent>> = vec![Vec::new(); n];
        let mut in_adj: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];

        for (route_idx, route) in routes.iter().enumerate() {
            let (Some(&u), Some(&v)) = (index.get(&route.origin), index.get(&route.destination))
            else {
                continue;
            };
            out_adj[u].push(Adjacent {
                target: v,
                weight: route.weight(),
                route: route_idx,
            });
            in_adj[v].push(u);
        }

        // Routes are sorted by (origin, destination) and indices follow code
        // order, so out lists are already sorted; in lists need a pass.
        for preds in &mut in_adj {
            preds.sort_unstable();
        }

        Self {
            airports,
            index,
            out_adj,
            in_adj,
            routes,
        }
    }

    /// Number of airports.
    pub fn num_airports(&self) -> usize {
        self.airports.len()
    }

    /// Number of routes.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Whether the graph has no airports.
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// All airports, ordered by code.
    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    /// All routes, ordered by (origin, destination).
    pub fn routes(&self) -> &[RouteEdge] {
        &self.routes
    }

    /// Whether an airport with this code is a node.
    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Look up an airport by code.
    pub fn airport(&self, code: &str) -> Option<&Airport> {
        self.index.get(code).map(|&i| &self.airports[i])
    }

    /// Look up the route `origin -> destination`.
    pub fn route(&self, origin: &str, destination: &str) -> Option<&RouteEdge> {
        let u = self.node_index(origin)?;
        let v = self.node_index(destination)?;
        let out = &self.out_adj[u];
        out.binary_search_by(|a| a.target.cmp(&v))
            .ok()
            .map(|i| &self.routes[out[i].route])
    }

    /// Airports reachable by one route from `code`.
    pub fn destinations(&self, code: &str) -> Vec<&AirportCode> {
        self.node_index(code)
            .map(|u| {
                self.out_adj[u]
                    .iter()
                    .map(|a| &self.airports[a.target].code)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of routes arriving at `code`.
    pub fn in_degree(&self, code: &str) -> usize {
        self.node_index(code).map_or(0, |i| self.in_adj[i].len())
    }

    /// Number of routes leaving `code`.
    pub fn out_degree(&self, code: &str) -> usize {
        self.node_index(code).map_or(0, |i| self.out_adj[i].len())
    }

    /// Index of an airport code.
    pub fn node_index(&self, code: &str) -> Option<NodeIndex> {
        self.index.get(code).copied()
    }

    /// Code of a node index.
    pub fn code(&self, node: NodeIndex) -> &AirportCode {
        &self.airports[node].code
    }

    /// Translate a path of indices to codes.
    pub(crate) fn codes(&self, path: &[NodeIndex]) -> Vec<AirportCode> {
        path.iter().map(|&i| self.code(i).clone()).collect()
    }
}

impl GraphView for FlightGraph {
    fn node_count(&self) -> usize {
        self.airports.len()
    }

    fn edge_count(&self) -> usize {
        self.routes.len()
    }

    fn successors(&self, node: NodeIndex) -> &[Adjacent] {
        &self.out_adj[node]
    }

    fn predecessors(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.in_adj[node]
    }
}
