//! CSV ingestion for airport and route tables.
//!
//! Airport tables carry `iata_code, airport_name, country, latitude,
//! longitude`; route tables carry `departure_iata, arrival_iata,
//! airline_iata, flight_number`. Extra columns are ignored. Cells that are
//! blank or do not parse become `None` and are dealt with by the builder.

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::types::{AirportRecord, RouteRecord};

/// Columns an airport table must have.
pub const AIRPORT_COLUMNS: [&str; 5] = ["iata_code", "airport_name", "country", "latitude", "longitude"];

/// Columns a route table must have.
pub const ROUTE_COLUMNS: [&str; 4] = ["departure_iata", "arrival_iata", "airline_iata", "flight_number"];

/// Errors raised while reading tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The CSV could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file could not be opened.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is absent from the header row.
    #[error("Missing column: {0}")]
    MissingColumn(String),
}

#[derive(Debug, Deserialize)]
struct AirportRow {
    iata_code: Option<String>,
    airport_name: Option<String>,
    country: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteRow {
    departure_iata: Option<String>,
    arrival_iata: Option<String>,
    airline_iata: Option<String>,
    flight_number: Option<String>,
}

fn text(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn number(cell: Option<String>) -> Option<f64> {
    text(cell).and_then(|s| s.parse().ok())
}

fn reader<R: Read>(input: R, required: &[&str]) -> Result<csv::Reader<R>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?;
    if let Some(missing) = required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(TableError::MissingColumn(missing.to_string()));
    }
    Ok(reader)
}

/// Read airport records from CSV.
pub fn read_airports<R: Read>(input: R) -> Result<Vec<AirportRecord>, TableError> {
    let mut reader = reader(input, &AIRPORT_COLUMNS)?;
    let mut records = Vec::new();

    for row in reader.deserialize::<AirportRow>() {
        let row = row?;
        records.push(AirportRecord {
            id: text(row.iata_code),
            name: text(row.airport_name),
            country: text(row.country),
            latitude: number(row.latitude),
            longitude: number(row.longitude),
            attributes: Default::default(),
        });
    }

    debug!(count = records.len(), "airport rows read");
    Ok(records)
}

/// Read route records from CSV.
pub fn read_routes<R: Read>(input: R) -> Result<Vec<RouteRecord>, TableError> {
    let mut reader = reader(input, &ROUTE_COLUMNS)?;
    let mut records = Vec::new();

    for row in reader.deserialize::<RouteRow>() {
        let row = row?;
        records.push(RouteRecord {
            origin: text(row.departure_iata),
            destination: text(row.arrival_iata),
            carrier: text(row.airline_iata),
            flight_number: text(row.flight_number),
            attributes: Default::default(),
        });
    }

    debug!(count = records.len(), "route rows read");
    Ok(records)
}

/// Read an airport table from a file.
pub fn read_airports_path(path: impl AsRef<Path>) -> Result<Vec<AirportRecord>, TableError> {
    read_airports(File::open(path)?)
}

/// Read a route table from a file.
pub fn read_routes_path(path: impl AsRef<Path>) -> Result<Vec<RouteRecord>, TableError> {
    read_routes(File::open(path)?)
}
