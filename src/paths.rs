//! Route search over a built flight graph.
//!
//! Three independent queries:
//!
//! - [`shortest_path_by_hops`]: fewest routes, ties broken by total distance
//! - [`shortest_path_by_distance`]: smallest total great-circle distance
//! - [`all_simple_paths`]: lazy enumeration of loop-free paths, optionally
//!   bounded by hop count
//!
//! Unknown airports and unreachable destinations are normal outcomes and
//! are reported as `None` or an empty iterator.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::{FlightGraph, GraphView, NodeIndex};
use crate::types::AirportCode;

/// A path with its hop count and total distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Airports in travel order.
    pub path: Vec<AirportCode>,
    /// Number of routes flown.
    pub hops: usize,
    /// Sum of route distances in kilometers.
    pub distance_km: f64,
}

impl RouteSummary {
    /// Summarize a path; `None` if any consecutive pair is not a route.
    pub fn from_path(graph: &FlightGraph, path: Vec<AirportCode>) -> Option<Self> {
        let distance_km = route_distance(graph, &path)?;
        Some(Self {
            hops: path.len().saturating_sub(1),
            path,
            distance_km,
        })
    }
}

/// Total distance along a path, or `None` if a hop is not a route.
///
/// An empty or single-airport path has distance 0 (if the airport exists).
pub fn route_distance(graph: &FlightGraph, path: &[AirportCode]) -> Option<f64> {
    match path {
        [] => Some(0.0),
        [only] => graph.contains(only.as_str()).then_some(0.0),
        _ => path
            .windows(2)
            .map(|w| graph.route(w[0].as_str(), w[1].as_str()).map(|r| r.weight()))
            .sum(),
    }
}

/// Path with the fewest hops; among equal-hop paths, the shortest in distance.
///
/// `start == end` yields the single-airport path. Returns `None` if either
/// airport is unknown or `end` is unreachable.
pub fn shortest_path_by_hops(graph: &FlightGraph, start: &str, end: &str) -> Option<Vec<AirportCode>> {
    let (s, t) = endpoints(graph, start, end)?;
    fewest_hops(graph, s, t).map(|p| graph.codes(&p))
}

/// Path with the smallest total distance (Dijkstra).
///
/// Returns `None` if either airport is unknown or `end` is unreachable.
pub fn shortest_path_by_distance(graph: &FlightGraph, start: &str, end: &str) -> Option<Vec<AirportCode>> {
    let (s, t) = endpoints(graph, start, end)?;
    shortest_weighted(graph, s, t).map(|p| graph.codes(&p))
}

/// Lazily enumerate every simple path from `start` to `end`.
///
/// With `max_hops`, only paths of at most that many routes are produced.
/// Without it the search is unbounded, which can blow up on dense graphs.
/// Unknown airports give an empty iterator. `start == end` yields only the
/// trivial path.
pub fn all_simple_paths<'g>(
    graph: &'g FlightGraph,
    start: &str,
    end: &str,
    max_hops: Option<usize>,
) -> SimplePaths<'g> {
    let inner = match endpoints(graph, start, end) {
        Some((s, t)) => SimplePathIndices::new(graph, s, t, max_hops),
        None => SimplePathIndices::exhausted(graph),
    };
    SimplePaths { graph, inner }
}

fn endpoints(graph: &FlightGraph, start: &str, end: &str) -> Option<(NodeIndex, NodeIndex)> {
    Some((graph.node_index(start)?, graph.node_index(end)?))
}

/// Iterator over simple paths as airport codes.
pub struct SimplePaths<'g> {
    graph: &'g FlightGraph,
    inner: SimplePathIndices<'g, FlightGraph>,
}

impl Iterator for SimplePaths<'_> {
    type Item = Vec<AirportCode>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|p| self.graph.codes(&p))
    }
}

/// A DFS frame: node on the current path and the next successor to try.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeIndex,
    next: usize,
}

/// Iterative DFS over simple paths, yielding node indices.
pub(crate) struct SimplePathIndices<'g, G: GraphView> {
    graph: &'g G,
    target: NodeIndex,
    max_hops: Option<usize>,
    stack: Vec<Frame>,
    on_path: Vec<bool>,
    trivial: Option<NodeIndex>,
}

impl<'g, G: GraphView> SimplePathIndices<'g, G> {
    pub(crate) fn new(graph: &'g G, source: NodeIndex, target: NodeIndex, max_hops: Option<usize>) -> Self {
        let mut search = Self::exhausted(graph);
        search.target = target;
        search.max_hops = max_hops;

        if source == target {
            search.trivial = Some(source);
        } else if max_hops != Some(0) {
            search.on_path = vec![false; graph.node_count()];
            search.on_path[source] = true;
            search.stack.push(Frame { node: source, next: 0 });
        }
        search
    }

    fn exhausted(graph: &'g G) -> Self {
        Self {
            graph,
            target: 0,
            max_hops: None,
            stack: Vec::new(),
            on_path: Vec::new(),
            trivial: None,
        }
    }

    fn within_limit(&self, hops: usize) -> bool {
        self.max_hops.map_or(true, |m| hops <= m)
    }
}

impl<G: GraphView> Iterator for SimplePathIndices<'_, G> {
    type Item = Vec<NodeIndex>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(node) = self.trivial.take() {
            return Some(vec![node]);
        }

        while let Some(frame) = self.stack.last_mut() {
            let node = frame.node;
            let successors = self.graph.successors(node);

            let Some(adj) = successors.get(frame.next) else {
                self.stack.pop();
                self.on_path[node] = false;
                continue;
            };
            frame.next += 1;

            let child = adj.target;
            if self.on_path[child] {
                continue;
            }

            // Routes flown once `child` is appended.
            let hops = self.stack.len();

            if child == self.target {
                let mut path: Vec<NodeIndex> = self.stack.iter().map(|f| f.node).collect();
                path.push(child);
                return Some(path);
            }

            // Only descend if a further hop can still reach the target in budget.
            if self.within_limit(hops + 1) {
                self.on_path[child] = true;
                self.stack.push(Frame { node: child, next: 0 });
            }
        }

        None
    }
}

/// Lexicographic path cost: hops first, distance second.
#[derive(Debug, Clone, Copy)]
struct HopCost {
    hops: usize,
    distance: f64,
}

/// Priority queue entry for both Dijkstra variants (min-heap).
#[derive(Debug, Clone, Copy)]
struct QueueEntry<C> {
    cost: C,
    node: NodeIndex,
}

trait PathCost: Copy {
    fn compare(&self, other: &Self) -> Ordering;
}

impl PathCost for HopCost {
    fn compare(&self, other: &Self) -> Ordering {
        self.hops
            .cmp(&other.hops)
            .then_with(|| self.distance.total_cmp(&other.distance))
    }
}

impl PathCost for f64 {
    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl<C: PathCost> PartialEq for QueueEntry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<C: PathCost> Eq for QueueEntry<C> {}

impl<C: PathCost> PartialOrd for QueueEntry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: PathCost> Ord for QueueEntry<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap and we pop the cheapest first.
        // Lower node index wins ties for determinism.
        other
            .cost
            .compare(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Generic single-pair Dijkstra. `extend` prices the step onto an edge.
fn dijkstra<G, C>(
    graph: &G,
    source: NodeIndex,
    target: NodeIndex,
    zero: C,
    extend: impl Fn(C, f64) -> C,
) -> Option<Vec<NodeIndex>>
where
    G: GraphView,
    C: PathCost,
{
    if source == target {
        return Some(vec![source]);
    }

    let n = graph.node_count();
    let mut best: Vec<Option<C>> = vec![None; n];
    let mut prev: Vec<Option<NodeIndex>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    best[source] = Some(zero);
    heap.push(QueueEntry { cost: zero, node: source });

    while let Some(QueueEntry { cost, node }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;
        if node == target {
            break;
        }

        for adj in graph.successors(node) {
            if settled[adj.target] {
                continue;
            }
            let candidate = extend(cost, adj.weight);
            let improves = best[adj.target].map_or(true, |b| candidate.compare(&b) == Ordering::Less);
            if improves {
                best[adj.target] = Some(candidate);
                prev[adj.target] = Some(node);
                heap.push(QueueEntry { cost: candidate, node: adj.target });
            }
        }
    }

    if !settled[target] {
        return None;
    }

    let mut path = vec![target];
    let mut cursor = target;
    while let Some(p) = prev[cursor] {
        path.push(p);
        cursor = p;
    }
    path.reverse();
    Some(path)
}

/// Fewest hops, then least distance.
///
/// Ordering paths by (hops, distance) gives exactly the minimum-distance
/// path among all minimum-hop paths, without enumerating them.
pub(crate) fn fewest_hops<G: GraphView>(graph: &G, source: NodeIndex, target: NodeIndex) -> Option<Vec<NodeIndex>> {
    dijkstra(
        graph,
        source,
        target,
        HopCost { hops: 0, distance: 0.0 },
        |c, w| HopCost {
            hops: c.hops + 1,
            distance: c.distance + w,
        },
    )
}

/// Least total distance.
pub(crate) fn shortest_weighted<G: GraphView>(graph: &G, source: NodeIndex, target: NodeIndex) -> Option<Vec<NodeIndex>> {
    dijkstra(graph, source, target, 0.0_f64, |c, w| c + w)
}
