//! Route types for the flight network.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::airport::AirportCode;

/// Edge attribute keys the graph owns; never carried in `attributes`.
pub(crate) const RESERVED_LINK_KEYS: &[&str] = &["source", "target", "airline", "flight", "weight"];

/// Route row as delivered by the data-cleaning stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Departure airport code.
    pub origin: Option<String>,
    /// Arrival airport code.
    pub destination: Option<String>,
    /// Carrier (airline) code.
    pub carrier: Option<String>,
    /// Flight number.
    pub flight_number: Option<String>,
    /// Any further attributes to carry on the edge.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl RouteRecord {
    /// Create a record between two airports.
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            destination: Some(destination.into()),
            ..Self::default()
        }
    }

    /// Set the carrier code.
    pub fn with_carrier(mut self, carrier: impl Into<String>) -> Self {
        self.carrier = Some(carrier.into());
        self
    }

    /// Set the flight number.
    pub fn with_flight_number(mut self, flight_number: impl Into<String>) -> Self {
        self.flight_number = Some(flight_number.into());
        self
    }

    /// Attach an extra attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Trimmed, non-empty endpoint codes.
    pub(crate) fn endpoints(&self) -> Result<(AirportCode, AirportCode), RouteRejection> {
        let clean = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(AirportCode::from)
        };
        match (clean(&self.origin), clean(&self.destination)) {
            (Some(o), Some(d)) => Ok((o, d)),
            _ => Err(RouteRejection::MissingEndpointId),
        }
    }
}

/// Why a route record did not become an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRejection {
    /// Origin or destination code absent.
    MissingEndpointId,
    /// Origin airport is not a node.
    UnknownOrigin,
    /// Destination airport is not a node.
    UnknownDestination,
}

impl fmt::Display for RouteRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEndpointId => write!(f, "missing endpoint id"),
            Self::UnknownOrigin => write!(f, "unknown origin airport"),
            Self::UnknownDestination => write!(f, "unknown destination airport"),
        }
    }
}

/// A directed route in a built graph.
///
/// The weight is the great-circle distance between the endpoints and
/// can only be set by the graph builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEdge {
    /// Departure airport.
    pub origin: AirportCode,
    /// Arrival airport.
    pub destination: AirportCode,
    /// Carrier code of the last route seen for this pair.
    pub carrier: Option<String>,
    /// Flight number of the last route seen for this pair.
    pub flight_number: Option<String>,
    /// Extra attributes carried through import/export.
    pub attributes: BTreeMap<String, serde_json::Value>,
    weight: f64,
}

impl RouteEdge {
    pub(crate) fn new(
        origin: AirportCode,
        destination: AirportCode,
        record: RouteRecord,
        weight: f64,
    ) -> Self {
        let mut attributes = record.attributes;
        attributes.retain(|k, _| !RESERVED_LINK_KEYS.contains(&k.as_str()));
        Self {
            origin,
            destination,
            carrier: record.carrier,
            flight_number: record.flight_number,
            attributes,
            weight,
        }
    }

    /// Distance in kilometers between the endpoints.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Whether the route starts and ends at the same airport.
    pub fn is_self_loop(&self) -> bool {
        self.origin == self.destination
    }
}
