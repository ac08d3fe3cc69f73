//! Graph construction from airport and route records.
//!
//! Records are validated leniently: airports without an id or usable
//! coordinates are skipped, and routes whose endpoints are not nodes are
//! dropped. Nothing is raised for either case; the [`BuildReport`] records
//! what was skipped and why.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::graph::FlightGraph;
use crate::types::{
    Airport, AirportCode, AirportRecord, AirportRejection, RouteEdge, RouteRecord, RouteRejection,
};

/// An airport record that did not become a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedAirport {
    /// Position of the record in the input.
    pub index: usize,
    /// Raw id, if any.
    pub id: Option<String>,
    /// Why it was skipped.
    pub reason: AirportRejection,
}

/// A route record that did not become an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRoute {
    /// Position of the record in the input.
    pub index: usize,
    /// Raw origin code, if any.
    pub origin: Option<String>,
    /// Raw destination code, if any.
    pub destination: Option<String>,
    /// Why it was dropped.
    pub reason: RouteRejection,
}

/// Diagnostics collected while building a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Airports that were skipped.
    pub skipped_airports: Vec<SkippedAirport>,
    /// Routes that were dropped.
    pub skipped_routes: Vec<SkippedRoute>,
    /// Airport records that overwrote an earlier record with the same code.
    pub duplicate_airports: usize,
    /// Route records collapsed onto an existing (origin, destination) edge.
    pub duplicate_routes: usize,
}

impl BuildReport {
    /// Whether every record made it into the graph unchanged.
    pub fn is_clean(&self) -> bool {
        self.skipped_airports.is_empty()
            && self.skipped_routes.is_empty()
            && self.duplicate_airports == 0
            && self.duplicate_routes == 0
    }
}

/// Incremental graph builder.
///
/// Airports and routes may be added in any order; routes are resolved
/// against the final airport set in [`finish`](Self::finish).
///
/// Duplicate handling:
/// - a repeated airport code replaces the earlier airport (last write wins)
/// - a repeated (origin, destination) pair is collapsed to one edge carrying
///   the last-seen carrier, flight number and attributes
#[derive(Debug, Default)]
pub struct GraphBuilder {
    airports: BTreeMap<AirportCode, Airport>,
    routes: Vec<(usize, RouteRecord)>,
    report: BuildReport,
    airport_count: usize,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph, discarding diagnostics.
    pub fn build<A, R>(airports: A, routes: R) -> FlightGraph
    where
        A: IntoIterator<Item = AirportRecord>,
        R: IntoIterator<Item = RouteRecord>,
    {
        Self::build_with_report(airports, routes).0
    }

    /// Build a graph and report what was skipped.
    pub fn build_with_report<A, R>(airports: A, routes: R) -> (FlightGraph, BuildReport)
    where
        A: IntoIterator<Item = AirportRecord>,
        R: IntoIterator<Item = RouteRecord>,
    {
        let mut builder = Self::new();
        for record in airports {
            builder.add_airport(record);
        }
        for record in routes {
            builder.add_route(record);
        }
        builder.finish()
    }

    /// Add an airport record.
    pub fn add_airport(&mut self, record: AirportRecord) -> &mut Self {
        let index = self.airport_count;
        self.airport_count += 1;

        let raw_id = record.id.clone();
        match record.validate() {
            Ok(airport) => {
                if self.airports.insert(airport.code.clone(), airport).is_some() {
                    self.report.duplicate_airports += 1;
                }
            }
            Err(reason) => {
                debug!(index, id = ?raw_id, %reason, "skipping airport record");
                self.report.skipped_airports.push(SkippedAirport {
                    index,
                    id: raw_id,
                    reason,
                });
            }
        }
        self
    }

    /// Add a route record.
    pub fn add_route(&mut self, record: RouteRecord) -> &mut Self {
        let index = self.routes.len();
        self.routes.push((index, record));
        self
    }

    /// Resolve routes and produce the graph.
    pub fn finish(self) -> (FlightGraph, BuildReport) {
        let Self {
            airports,
            routes,
            mut report,
            ..
        } = self;

        let mut edges: BTreeMap<(AirportCode, AirportCode), RouteEdge> = BTreeMap::new();

        for (index, record) in routes {
            let resolved = record.endpoints().and_then(|(origin, destination)| {
                let from = airports.get(&origin).ok_or(RouteRejection::UnknownOrigin)?;
                let to = airports
                    .get(&destination)
                    .ok_or(RouteRejection::UnknownDestination)?;
                Ok((origin, destination, from.distance_to(to)))
            });

            match resolved {
                Ok((origin, destination, weight)) => {
                    let edge = RouteEdge::new(origin.clone(), destination.clone(), record, weight);
                    if edges.insert((origin, destination), edge).is_some() {
                        report.duplicate_routes += 1;
                    }
                }
                Err(reason) => {
                    debug!(
                        index,
                        origin = ?record.origin,
                        destination = ?record.destination,
                        %reason,
                        "dropping route record"
                    );
                    report.skipped_routes.push(SkippedRoute {
                        index,
                        origin: record.origin,
                        destination: record.destination,
                        reason,
                    });
                }
            }
        }

        let graph = FlightGraph::from_parts(
            airports.into_values().collect(),
            edges.into_values().collect(),
        );

        info!(
            airports = graph.num_airports(),
            routes = graph.num_routes(),
            skipped_airports = report.skipped_airports.len(),
            skipped_routes = report.skipped_routes.len(),
            duplicate_routes = report.duplicate_routes,
            "flight graph built"
        );

        (graph, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangling_routes_dropped() {
        let (g, report) = GraphBuilder::build_with_report(
            vec![
                AirportRecord::new("A", 0.0, 0.0),
                AirportRecord::new("B", 0.0, 1.0),
            ],
            vec![RouteRecord::new("A", "C"), RouteRecord::new("C", "B")],
        );

        assert_eq!(g.num_airports(), 2);
        assert_eq!(g.num_routes(), 0);
        assert_eq!(report.skipped_routes.len(), 2);
        assert_eq!(report.skipped_routes[0].reason, RouteRejection::UnknownDestination);
        assert_eq!(report.skipped_routes[1].reason, RouteRejection::UnknownOrigin);
    }

    #[test]
    fn test_invalid_airports_invalidate_routes() {
        let mut no_coords = AirportRecord::new("B", 0.0, 0.0);
        no_coords.latitude = None;

        let (g, report) = GraphBuilder::build_with_report(
            vec![AirportRecord::new("A", 0.0, 0.0), no_coords],
            vec![RouteRecord::new("A", "B")],
        );

        assert!(g.contains("A"));
        assert!(!g.contains("B"));
        assert_eq!(g.num_routes(), 0);
        assert_eq!(report.skipped_airports.len(), 1);
        assert_eq!(report.skipped_airports[0].index, 1);
        assert_eq!(report.skipped_airports[0].reason, AirportRejection::MissingCoordinates);
    }

    #[test]
    fn test_duplicate_airport_last_write_wins() {
        let (g, report) = GraphBuilder::build_with_report(
            vec![
                AirportRecord::new("A", 0.0, 0.0).with_name("First"),
                AirportRecord::new("A", 1.0, 1.0).with_name("Second"),
            ],
            Vec::<RouteRecord>::new(),
        );

        assert_eq!(g.num_airports(), 1);
        assert_eq!(g.airport("A").unwrap().name.as_deref(), Some("Second"));
        assert_eq!(report.duplicate_airports, 1);
    }

    #[test]
    fn test_parallel_routes_collapsed_last_seen() {
        let (g, report) = GraphBuilder::build_with_report(
            vec![
                AirportRecord::new("A", 0.0, 0.0),
                AirportRecord::new("B", 0.0, 1.0),
            ],
            vec![
                RouteRecord::new("A", "B").with_carrier("VN").with_flight_number("1"),
                RouteRecord::new("A", "B").with_carrier("VJ").with_flight_number("2"),
            ],
        );

        assert_eq!(g.num_routes(), 1);
        let edge = g.route("A", "B").unwrap();
        assert_eq!(edge.carrier.as_deref(), Some("VJ"));
        assert_eq!(edge.flight_number.as_deref(), Some("2"));
        assert_eq!(report.duplicate_routes, 1);
    }

    #[test]
    fn test_weight_is_haversine() {
        let g = GraphBuilder::build(
            vec![
                AirportRecord::new("A", 0.0, 0.0),
                AirportRecord::new("B", 0.0, 1.0),
            ],
            vec![RouteRecord::new("A", "B")],
        );

        let expected = crate::geo::distance_km(0.0, 0.0, 0.0, 1.0);
        assert_eq!(g.route("A", "B").unwrap().weight(), expected);
    }

    #[test]
    fn test_routes_before_airports() {
        let mut builder = GraphBuilder::new();
        builder.add_route(RouteRecord::new("A", "B"));
        builder
            .add_airport(AirportRecord::new("A", 0.0, 0.0))
            .add_airport(AirportRecord::new("B", 1.0, 0.0));
        let (g, report) = builder.finish();

        assert_eq!(g.num_routes(), 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_self_loop_kept_with_zero_weight() {
        let g = GraphBuilder::build(
            vec![AirportRecord::new("A", 10.0, 10.0)],
            vec![RouteRecord::new("A", "A")],
        );

        let edge = g.route("A", "A").unwrap();
        assert!(edge.is_self_loop());
        assert_eq!(edge.weight(), 0.0);
    }
}
