//! Node-link interchange format.
//!
//! The document shape consumed by visualization tools:
//!
//! ```json
//! {
//!   "directed": true,
//!   "multigraph": false,
//!   "graph": { "snapshot_id": "..." },
//!   "nodes": [{ "id": "HAN", "name": "...", "country": "VN", "lat": 21.0, "lon": 105.8 }],
//!   "links": [{ "source": "HAN", "target": "SGN", "airline": "VN", "flight": "213", "weight": 1138.3 }]
//! }
//! ```
//!
//! Unknown keys on nodes and links are kept as attributes. `edges` is
//! accepted as an alias for `links`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::StoreError;
use crate::builder::{BuildReport, GraphBuilder};
use crate::graph::FlightGraph;
use crate::snapshot::GraphSnapshot;
use crate::types::{AirportRecord, RouteRecord};

/// Largest tolerated difference between a stored and a recomputed weight (km).
pub const WEIGHT_TOLERANCE_KM: f64 = 1e-6;

/// A node-link graph document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkDocument {
    /// Always `true` for flight graphs.
    pub directed: bool,
    /// Parallel edges are collapsed, so always `false` on export.
    #[serde(default)]
    pub multigraph: bool,
    /// Graph-level attributes.
    #[serde(default)]
    pub graph: BTreeMap<String, serde_json::Value>,
    /// Airport nodes.
    pub nodes: Vec<NodeEntry>,
    /// Route links.
    #[serde(alias = "edges")]
    pub links: Vec<LinkEntry>,
}

/// A node in a node-link document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// Airport code.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Latitude in degrees.
    #[serde(default, alias = "latitude")]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[serde(default, alias = "longitude")]
    pub lon: Option<f64>,
    /// Any other node attributes.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// A link in a node-link document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Origin airport code.
    #[serde(default, deserialize_with = "string_or_number")]
    pub source: Option<String>,
    /// Destination airport code.
    #[serde(default, deserialize_with = "string_or_number")]
    pub target: Option<String>,
    /// Carrier code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline: Option<String>,
    /// Flight number.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub flight: Option<String>,
    /// Great-circle distance in kilometers.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Any other link attributes.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// Accept `"123"`, `123` or `null` for code-like fields.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}

/// Convert a graph to its node-link document.
pub fn export(graph: &FlightGraph) -> NodeLinkDocument {
    let snapshot = GraphSnapshot::compute(graph);

    let mut attrs = BTreeMap::new();
    attrs.insert("snapshot_id".to_string(), serde_json::Value::from(snapshot.snapshot_id));
    attrs.insert("schema_version".to_string(), serde_json::Value::from(snapshot.schema_version));

    let nodes = graph
        .airports()
        .iter()
        .map(|a| NodeEntry {
            id: Some(a.code.to_string()),
            name: a.name.clone(),
            country: a.country.clone(),
            lat: Some(a.lat),
            lon: Some(a.lon),
            attributes: a.attributes.clone(),
        })
        .collect();

    let links = graph
        .routes()
        .iter()
        .map(|r| LinkEntry {
            source: Some(r.origin.to_string()),
            target: Some(r.destination.to_string()),
            airline: r.carrier.clone(),
            flight: r.flight_number.clone(),
            weight: Some(r.weight()),
            attributes: r.attributes.clone(),
        })
        .collect();

    NodeLinkDocument {
        directed: true,
        multigraph: false,
        graph: attrs,
        nodes,
        links,
    }
}

/// Rebuild a graph from a node-link document, discarding diagnostics.
pub fn import(document: NodeLinkDocument) -> Result<FlightGraph, StoreError> {
    import_with_report(document).map(|(graph, _)| graph)
}

/// Rebuild a graph from a node-link document.
///
/// Nodes without coordinates and links to unknown nodes are skipped the same
/// way [`GraphBuilder`] skips records. Weights are recomputed from
/// coordinates; a stored weight that disagrees is an error.
pub fn import_with_report(document: NodeLinkDocument) -> Result<(FlightGraph, BuildReport), StoreError> {
    if !document.directed {
        return Err(StoreError::Undirected);
    }

    let mut builder = GraphBuilder::new();
    for node in document.nodes {
        builder.add_airport(AirportRecord {
            id: node.id,
            name: node.name,
            country: node.country,
            latitude: node.lat,
            longitude: node.lon,
            attributes: node.attributes,
        });
    }

    let mut stored_weights = Vec::new();
    for link in document.links {
        if let (Some(source), Some(target), Some(weight)) = (&link.source, &link.target, link.weight) {
            stored_weights.push((source.clone(), target.clone(), weight));
        }
        builder.add_route(RouteRecord {
            origin: link.source,
            destination: link.target,
            carrier: link.airline,
            flight_number: link.flight,
            attributes: link.attributes,
        });
    }

    let (graph, report) = builder.finish();

    for (source, target, stored) in stored_weights {
        let Some(route) = graph.route(source.trim(), target.trim()) else {
            continue;
        };
        if !stored.is_finite() || (route.weight() - stored).abs() > WEIGHT_TOLERANCE_KM {
            return Err(StoreError::WeightMismatch {
                source_id: source,
                target_id: target,
                stored,
                computed: route.weight(),
            });
        }
    }

    debug!(
        airports = graph.num_airports(),
        routes = graph.num_routes(),
        "node-link document imported"
    );

    Ok((graph, report))
}

/// Serialize a graph to pretty node-link JSON.
pub fn to_json(graph: &FlightGraph) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(&export(graph))?)
}

/// Parse node-link JSON into a graph.
pub fn from_json(json: &str) -> Result<FlightGraph, StoreError> {
    let document: NodeLinkDocument = serde_json::from_str(json)?;
    import(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AirportRecord, RouteRecord};
    use serde_json::json;

    fn sample() -> FlightGraph {
        GraphBuilder::build(
            vec![
                AirportRecord::new("HAN", 21.0, 105.8)
                    .with_name("Noi Bai")
                    .with_country("VN")
                    .with_attribute("hub", json!(true)),
                AirportRecord::new("SGN", 10.8, 106.7).with_name("Tan Son Nhat"),
            ],
            vec![RouteRecord::new("HAN", "SGN")
                .with_carrier("VN")
                .with_flight_number("213")
                .with_attribute("seasonal", json!(false))],
        )
    }

    #[test]
    fn test_export_shape() {
        let value = serde_json::to_value(export(&sample())).unwrap();

        assert_eq!(value["directed"], json!(true));
        assert_eq!(value["multigraph"], json!(false));
        assert_eq!(value["nodes"][0]["id"], json!("HAN"));
        assert_eq!(value["nodes"][0]["hub"], json!(true));
        assert_eq!(value["links"][0]["source"], json!("HAN"));
        assert_eq!(value["links"][0]["target"], json!("SGN"));
        assert_eq!(value["links"][0]["airline"], json!("VN"));
        assert_eq!(value["links"][0]["seasonal"], json!(false));
        assert!(value["links"][0]["weight"].as_f64().unwrap() > 1000.0);
        assert!(value["graph"]["snapshot_id"].is_string());
    }

    #[test]
    fn test_round_trip() {
        let g = sample();
        let back = from_json(&to_json(&g).unwrap()).unwrap();

        assert_eq!(back.airports(), g.airports());
        assert_eq!(back.routes(), g.routes());
    }

    #[test]
    fn test_import_networkx_style_document() {
        // No weights, numeric flight numbers, `edges` key, extra graph attrs.
        let doc = json!({
            "directed": true,
            "multigraph": false,
            "graph": {},
            "nodes": [
                {"id": "HAN", "name": "Noi Bai", "country": "Vietnam", "lat": 21, "lon": 105.8},
                {"id": "DAD", "lat": 16.0, "lon": 108.2},
                {"id": "XXX", "name": "No coordinates"}
            ],
            "edges": [
                {"source": "HAN", "target": "DAD", "airline": "VJ", "flight": 501},
                {"source": "HAN", "target": "XXX", "airline": "VJ", "flight": 502}
            ]
        });

        let (g, report) = import_with_report(serde_json::from_value(doc).unwrap()).unwrap();
        assert_eq!(g.num_airports(), 2);
        assert_eq!(g.num_routes(), 1);
        assert_eq!(g.route("HAN", "DAD").unwrap().flight_number.as_deref(), Some("501"));
        assert_eq!(g.airport("HAN").unwrap().lat, 21.0);
        assert_eq!(report.skipped_airports.len(), 1);
        assert_eq!(report.skipped_routes.len(), 1);
    }

    #[test]
    fn test_undirected_rejected() {
        let doc = NodeLinkDocument {
            directed: false,
            multigraph: false,
            graph: BTreeMap::new(),
            nodes: Vec::new(),
            links: Vec::new(),
        };
        assert!(matches!(import(doc), Err(StoreError::Undirected)));
    }

    #[test]
    fn test_weight_mismatch_rejected() {
        let mut doc = export(&sample());
        doc.links[0].weight = Some(1.0);
        assert!(matches!(import(doc), Err(StoreError::WeightMismatch { .. })));
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        assert!(matches!(from_json("{\"nodes\": 3}"), Err(StoreError::Decode(_))));
        assert!(matches!(from_json("not json"), Err(StoreError::Decode(_))));
    }
}
