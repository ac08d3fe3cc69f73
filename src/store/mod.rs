//! Graph persistence.
//!
//! Graphs are persisted as node-link documents (see [`node_link`]). A
//! [`GraphStore`] saves and loads whole graphs; loading always goes through
//! the same validation as building from records.

pub mod file;
pub mod memory;
pub mod node_link;

use crate::graph::FlightGraph;

/// Errors raised while persisting or restoring a graph.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The document is not valid node-link JSON.
    #[error("Malformed node-link document: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Flight graphs are directed; undirected documents are refused.
    #[error("Node-link document is undirected")]
    Undirected,

    /// A stored edge weight disagrees with the coordinates of its endpoints.
    #[error("Stored weight {stored} for {source_id}->{target_id} does not match computed {computed}")]
    WeightMismatch {
        /// Origin code.
        source_id: String,
        /// Destination code.
        target_id: String,
        /// Weight found in the document.
        stored: f64,
        /// Weight recomputed from coordinates.
        computed: f64,
    },
}

/// Trait for graph storage backends.
///
/// Implementations store one graph at a time; `save` replaces whatever was
/// stored before.
pub trait GraphStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a graph.
    fn save(&self, graph: &FlightGraph) -> Result<(), Self::Error>;

    /// Load the stored graph, or `None` if nothing has been saved.
    fn load(&self) -> Result<Option<FlightGraph>, Self::Error>;
}

pub use file::JsonFileStore;
pub use memory::InMemoryGraphStore;
pub use node_link::{export, from_json, import, import_with_report, to_json, LinkEntry, NodeEntry, NodeLinkDocument};
