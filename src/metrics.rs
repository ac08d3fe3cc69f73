//! Aggregate graph metrics and airport centrality.
//!
//! - [`graph_metrics`]: density, average degree, diameter of the largest
//!   weakly connected component
//! - [`betweenness_centrality`]: distance-weighted, normalized betweenness
//!   (Brandes' algorithm with Dijkstra)
//! - [`top_hubs`] / [`busiest_airports`]: rankings for reports

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

use crate::graph::{FlightGraph, GraphView, NodeIndex};
use crate::types::AirportCode;

/// Summary statistics for a flight graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    /// Number of airports.
    pub airports: usize,
    /// Number of routes.
    pub routes: usize,
    /// `routes / (airports * (airports - 1))`, 0 below two airports.
    pub density: f64,
    /// Mean of in-degree + out-degree, 0 for an empty graph.
    pub average_degree: f64,
    /// Longest shortest hop count inside the largest weakly connected
    /// component, ignoring direction. `None` for an empty graph.
    pub diameter: Option<usize>,
    /// Number of weakly connected components.
    pub weak_components: usize,
    /// Airports in the largest weakly connected component.
    pub largest_component: usize,
}

/// Compute density, average degree and diameter.
pub fn graph_metrics(graph: &FlightGraph) -> GraphMetrics {
    let n = graph.node_count();
    let m = graph.edge_count();

    if n == 0 {
        return GraphMetrics {
            airports: 0,
            routes: 0,
            density: 0.0,
            average_degree: 0.0,
            diameter: None,
            weak_components: 0,
            largest_component: 0,
        };
    }

    let density = if n < 2 {
        0.0
    } else {
        m as f64 / (n as f64 * (n as f64 - 1.0))
    };

    let total_degree: usize = (0..n)
        .map(|v| graph.successors(v).len() + graph.predecessors(v).len())
        .sum();
    let average_degree = total_degree as f64 / n as f64;

    let components = weak_components(graph);
    // First component wins ties; components are discovered in code order.
    let largest = components
        .iter()
        .fold(None::<&Vec<NodeIndex>>, |best, c| match best {
            Some(b) if b.len() >= c.len() => Some(b),
            _ => Some(c),
        });

    GraphMetrics {
        airports: n,
        routes: m,
        density,
        average_degree,
        diameter: largest.map(|c| undirected_diameter(graph, c)),
        weak_components: components.len(),
        largest_component: largest.map_or(0, Vec::len),
    }
}

/// Neighbors of `v` ignoring edge direction (may repeat a node).
fn undirected_neighbors<G: GraphView>(graph: &G, v: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
    graph
        .successors(v)
        .iter()
        .map(|a| a.target)
        .chain(graph.predecessors(v).iter().copied())
}

/// Weakly connected components, each listed in ascending node order.
pub(crate) fn weak_components<G: GraphView>(graph: &G) -> Vec<Vec<NodeIndex>> {
    let n = graph.node_count();
    let mut seen = vec![false; n];
    let mut components = Vec::new();

    for root in 0..n {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        let mut component = vec![root];
        let mut queue = VecDeque::from([root]);
        while let Some(v) = queue.pop_front() {
            for w in undirected_neighbors(graph, v) {
                if !seen[w] {
                    seen[w] = true;
                    component.push(w);
                    queue.push_back(w);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }

    components
}

/// Maximum eccentricity over the component, by undirected BFS.
fn undirected_diameter<G: GraphView>(graph: &G, component: &[NodeIndex]) -> usize {
    let n = graph.node_count();
    let mut dist: Vec<Option<usize>> = vec![None; n];
    let mut queue = VecDeque::new();
    let mut diameter = 0;

    for &source in component {
        for &v in component {
            dist[v] = None;
        }
        dist[source] = Some(0);
        queue.clear();
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            let d = dist[v].unwrap_or(0);
            diameter = diameter.max(d);
            for w in undirected_neighbors(graph, v) {
                if dist[w].is_none() {
                    dist[w] = Some(d + 1);
                    queue.push_back(w);
                }
            }
        }
    }

    diameter
}

/// Min-heap entry for the Dijkstra phase of Brandes' algorithm.
#[derive(Debug, Clone, Copy)]
struct Settle {
    dist: f64,
    node: NodeIndex,
}

impl PartialEq for Settle {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Settle {}

impl PartialOrd for Settle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Settle {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Normalized betweenness centrality using route distance as path length.
///
/// Shortest paths are weighted by distance, not hop count. Scores are scaled
/// by `1 / ((n - 1)(n - 2))` for `n > 2` and lie in `[0, 1]`. Self-loops are
/// ignored. Runs in `O(V * E log V)`.
///
/// Limitation: a zero-length route (two airports sharing coordinates) is not
/// counted as an extra shortest path when its target was settled first at the
/// same distance, so such ties are undercounted.
pub fn betweenness_centrality(graph: &FlightGraph) -> BTreeMap<AirportCode, f64> {
    let scores = weighted_betweenness(graph);
    scores
        .into_iter()
        .enumerate()
        .map(|(v, score)| (graph.code(v).clone(), score))
        .collect()
}

pub(crate) fn weighted_betweenness<G: GraphView>(graph: &G) -> Vec<f64> {
    let n = graph.node_count();
    let mut betweenness = vec![0.0_f64; n];
    if n == 0 {
        return betweenness;
    }

    // Per-source scratch, reset for each source.
    let mut order: Vec<NodeIndex> = Vec::with_capacity(n);
    let mut preds: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0_f64; n];
    let mut dist: Vec<Option<f64>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut delta = vec![0.0_f64; n];
    let mut heap = BinaryHeap::new();

    for source in 0..n {
        order.clear();
        for v in 0..n {
            preds[v].clear();
            sigma[v] = 0.0;
            dist[v] = None;
            settled[v] = false;
            delta[v] = 0.0;
        }

        sigma[source] = 1.0;
        dist[source] = Some(0.0);
        heap.push(Settle { dist: 0.0, node: source });

        while let Some(Settle { dist: d, node: v }) = heap.pop() {
            if settled[v] {
                continue;
            }
            settled[v] = true;
            order.push(v);

            for adj in graph.successors(v) {
                let w = adj.target;
                if w == v || settled[w] {
                    continue;
                }
                let candidate = d + adj.weight;
                match dist[w] {
                    Some(current) if candidate > current => {}
                    Some(current) if candidate == current => {
                        sigma[w] += sigma[v];
                        preds[w].push(v);
                    }
                    _ => {
                        dist[w] = Some(candidate);
                        sigma[w] = sigma[v];
                        preds[w].clear();
                        preds[w].push(v);
                        heap.push(Settle { dist: candidate, node: w });
                    }
                }
            }
        }

        while let Some(w) = order.pop() {
            for &v in &preds[w] {
                if sigma[w] > 0.0 {
                    delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
                }
            }
            if w != source {
                betweenness[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        for b in &mut betweenness {
            *b = (*b * scale).clamp(0.0, 1.0);
        }
    }

    betweenness
}

/// An airport and its centrality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubScore {
    /// Airport code.
    pub code: AirportCode,
    /// Betweenness centrality.
    pub score: f64,
}

/// The `n` most central airports, highest first, ties by code.
pub fn top_hubs(centrality: &BTreeMap<AirportCode, f64>, n: usize) -> Vec<HubScore> {
    let mut ranked: Vec<HubScore> = centrality
        .iter()
        .map(|(code, &score)| HubScore {
            code: code.clone(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.code.cmp(&b.code)));
    ranked.truncate(n);
    ranked
}

/// An airport and how many routes touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportDegree {
    /// Airport code.
    pub code: AirportCode,
    /// Routes departing.
    pub departures: usize,
    /// Routes arriving.
    pub arrivals: usize,
    /// `departures + arrivals`.
    pub total_routes: usize,
}

/// The `n` airports with the most routes, ties by code.
pub fn busiest_airports(graph: &FlightGraph, n: usize) -> Vec<AirportDegree> {
    let mut ranked: Vec<AirportDegree> = (0..graph.node_count())
        .map(|v| {
            let departures = graph.successors(v).len();
            let arrivals = graph.predecessors(v).len();
            AirportDegree {
                code: graph.code(v).clone(),
                departures,
                arrivals,
                total_routes: departures + arrivals,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.total_routes.cmp(&a.total_routes).then_with(|| a.code.cmp(&b.code)));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::types::{AirportRecord, RouteRecord};

    fn line(n: usize) -> FlightGraph {
        let airports = (0..n).map(|i| AirportRecord::new(format!("N{i}"), 0.0, i as f64));
        let routes = (1..n).map(|i| RouteRecord::new(format!("N{}", i - 1), format!("N{i}")));
        GraphBuilder::build(airports, routes)
    }

    #[test]
    fn test_empty_graph() {
        let g = FlightGraph::new();
        let m = graph_metrics(&g);
        assert_eq!(m.density, 0.0);
        assert_eq!(m.average_degree, 0.0);
        assert_eq!(m.diameter, None);
        assert!(betweenness_centrality(&g).is_empty());
    }

    #[test]
    fn test_single_airport() {
        let g = line(1);
        let m = graph_metrics(&g);
        assert_eq!(m.density, 0.0);
        assert_eq!(m.diameter, Some(0));
        assert_eq!(betweenness_centrality(&g).get("N0"), Some(&0.0));
    }

    #[test]
    fn test_line_metrics() {
        let g = line(4);
        let m = graph_metrics(&g);
        assert_eq!(m.routes, 3);
        assert!((m.density - 3.0 / 12.0).abs() < 1e-12);
        assert!((m.average_degree - 1.5).abs() < 1e-12);
        assert_eq!(m.diameter, Some(3));
        assert_eq!(m.weak_components, 1);
    }

    #[test]
    fn test_diameter_uses_largest_component() {
        let g = GraphBuilder::build(
            vec![
                AirportRecord::new("A", 0.0, 0.0),
                AirportRecord::new("B", 0.0, 1.0),
                AirportRecord::new("C", 0.0, 2.0),
                AirportRecord::new("D", 0.0, 3.0),
                AirportRecord::new("E", 10.0, 0.0),
                AirportRecord::new("F", 10.0, 1.0),
            ],
            vec![
                // Direction is ignored: A - B - C - D is one component.
                RouteRecord::new("B", "A"),
                RouteRecord::new("B", "C"),
                RouteRecord::new("D", "C"),
                RouteRecord::new("E", "F"),
            ],
        );
        let m = graph_metrics(&g);
        assert_eq!(m.weak_components, 2);
        assert_eq!(m.largest_component, 4);
        assert_eq!(m.diameter, Some(3));
    }

    #[test]
    fn test_line_betweenness() {
        // Directed 4-line: N1 lies on (N0,N2),(N0,N3) -> 2 / 6.
        let g = line(4);
        let bc = betweenness_centrality(&g);
        assert_eq!(bc["N0"], 0.0);
        assert_eq!(bc["N3"], 0.0);
        assert!((bc["N1"] - 2.0 / 6.0).abs() < 1e-12);
        assert!((bc["N2"] - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_equal_paths_split_credit() {
        // S -> A -> T and S -> B -> T have identical length.
        let g = GraphBuilder::build(
            vec![
                AirportRecord::new("S", 0.0, 0.0),
                AirportRecord::new("A", 1.0, 1.0),
                AirportRecord::new("B", -1.0, 1.0),
                AirportRecord::new("T", 0.0, 2.0),
            ],
            vec![
                RouteRecord::new("S", "A"),
                RouteRecord::new("S", "B"),
                RouteRecord::new("A", "T"),
                RouteRecord::new("B", "T"),
            ],
        );
        let bc = betweenness_centrality(&g);
        assert!((bc["A"] - bc["B"]).abs() < 1e-12);
        assert!((bc["A"] - 0.5 / 6.0).abs() < 1e-9, "A={}", bc["A"]);
    }

    #[test]
    fn test_rankings() {
        let g = GraphBuilder::build(
            vec![
                AirportRecord::new("HUB", 0.0, 0.0),
                AirportRecord::new("L1", 1.0, 0.0),
                AirportRecord::new("L2", -1.0, 0.0),
                AirportRecord::new("L3", 0.0, 1.0),
            ],
            vec![
                RouteRecord::new("L1", "HUB"),
                RouteRecord::new("HUB", "L2"),
                RouteRecord::new("HUB", "L3"),
                RouteRecord::new("L2", "HUB"),
            ],
        );

        let busiest = busiest_airports(&g, 2);
        assert_eq!(busiest[0].code.as_str(), "HUB");
        assert_eq!(busiest[0].total_routes, 4);
        assert_eq!(busiest[1].code.as_str(), "L2");

        let hubs = top_hubs(&betweenness_centrality(&g), 1);
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].code.as_str(), "HUB");
        assert!(hubs[0].score > 0.0);
    }

    #[test]
    fn test_zero_length_tie_not_counted() {
        // B and C share coordinates; A->C->B ties A->B but B settles before C.
        let g = GraphBuilder::build(
            vec![
                AirportRecord::new("A", 0.0, 0.0),
                AirportRecord::new("B", 0.0, 1.0),
                AirportRecord::new("C", 0.0, 1.0),
            ],
            vec![
                RouteRecord::new("A", "B"),
                RouteRecord::new("A", "C"),
                RouteRecord::new("C", "B"),
            ],
        );
        assert_eq!(g.route("C", "B").unwrap().weight(), 0.0);

        let scores = betweenness_centrality(&g);
        assert_eq!(scores["C"], 0.0);
        assert!(scores.values().all(|s| (0.0..=1.0).contains(s)));
    }
}
