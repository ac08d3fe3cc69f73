//! Airport types for the flight network.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::geo::distance_km;

/// Node attribute keys the graph owns; never carried in `attributes`.
pub(crate) const RESERVED_NODE_KEYS: &[&str] = &["id", "name", "country", "lat", "lon"];

/// Unique identifier for an airport (IATA-like code).
///
/// Implements `Ord` so every map keyed by airport iterates deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirportCode(String);

impl AirportCode {
    /// Create a new code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for AirportCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AirportCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for AirportCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Airport row as delivered by the data-cleaning stage.
///
/// Every field is optional here; validation happens when the record
/// is turned into an [`Airport`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    /// Airport code.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Country name or code.
    pub country: Option<String>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// Any further attributes to carry on the node.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl AirportRecord {
    /// Create a record with an id and coordinates.
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Some(id.into()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::default()
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the country.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Attach an extra attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Validate the record into a graph node.
    pub fn validate(self) -> Result<Airport, AirportRejection> {
        let code = match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => AirportCode::new(id),
            _ => return Err(AirportRejection::MissingId),
        };

        let (lat, lon) = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
            (None, _) | (_, None) => return Err(AirportRejection::MissingCoordinates),
            _ => return Err(AirportRejection::NonFiniteCoordinates),
        };

        let mut attributes = self.attributes;
        attributes.retain(|k, _| !RESERVED_NODE_KEYS.contains(&k.as_str()));

        Ok(Airport {
            code,
            name: self.name,
            country: self.country,
            lat,
            lon,
            attributes,
        })
    }
}

/// Why an airport record did not become a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportRejection {
    /// No id, or an empty one.
    MissingId,
    /// Latitude or longitude absent.
    MissingCoordinates,
    /// Latitude or longitude NaN or infinite.
    NonFiniteCoordinates,
}

impl fmt::Display for AirportRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId => write!(f, "missing id"),
            Self::MissingCoordinates => write!(f, "missing coordinates"),
            Self::NonFiniteCoordinates => write!(f, "non-finite coordinates"),
        }
    }
}

/// An airport node in a built graph.
///
/// Coordinates are always present and finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// Unique code.
    pub code: AirportCode,
    /// Display name.
    pub name: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Extra attributes carried through import/export.
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Airport {
    /// Great-circle distance to another airport in kilometers.
    pub fn distance_to(&self, other: &Airport) -> f64 {
        distance_km(self.lat, self.lon, other.lat, other.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_complete_record() {
        let airport = AirportRecord::new("HAN", 21.0, 105.8)
            .with_name("Noi Bai")
            .with_country("VN")
            .validate()
            .unwrap();

        assert_eq!(airport.code.as_str(), "HAN");
        assert_eq!(airport.name.as_deref(), Some("Noi Bai"));
        assert_eq!(airport.lat, 21.0);
    }

    #[test]
    fn test_validate_rejects_missing_id() {
        let mut record = AirportRecord::new("", 1.0, 2.0);
        assert_eq!(record.clone().validate(), Err(AirportRejection::MissingId));

        record.id = None;
        assert_eq!(record.validate(), Err(AirportRejection::MissingId));
    }

    #[test]
    fn test_validate_rejects_bad_coordinates() {
        let mut record = AirportRecord::new("SGN", 10.8, 106.7);
        record.longitude = None;
        assert_eq!(record.validate(), Err(AirportRejection::MissingCoordinates));

        let record = AirportRecord::new("SGN", f64::NAN, 106.7);
        assert_eq!(record.validate(), Err(AirportRejection::NonFiniteCoordinates));
    }

    #[test]
    fn test_reserved_attributes_are_dropped() {
        let airport = AirportRecord::new("DAD", 16.0, 108.2)
            .with_attribute("lat", serde_json::json!(0.0))
            .with_attribute("hub", serde_json::json!(true))
            .validate()
            .unwrap();

        assert_eq!(airport.lat, 16.0);
        assert!(!airport.attributes.contains_key("lat"));
        assert_eq!(airport.attributes.get("hub"), Some(&serde_json::json!(true)));
    }
}
