//! Core record and node/edge types for the flight network.

pub mod airport;
pub mod route;

pub use airport::{Airport, AirportCode, AirportRecord, AirportRejection};
pub use route::{RouteEdge, RouteRecord, RouteRejection};
