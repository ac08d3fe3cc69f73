//! In-memory graph store for testing.

use parking_lot::RwLock;

use super::{node_link, GraphStore, NodeLinkDocument, StoreError};
use crate::graph::FlightGraph;

/// In-memory graph store.
///
/// Holds the exported document rather than the graph itself, so a load
/// exercises the same import path as a file.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    document: RwLock<Option<NodeLinkDocument>>,
}

impl InMemoryGraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `document`.
    pub fn with_document(document: NodeLinkDocument) -> Self {
        Self {
            document: RwLock::new(Some(document)),
        }
    }

    /// The stored document, if any.
    pub fn document(&self) -> Option<NodeLinkDocument> {
        self.document.read().clone()
    }

    /// Drop the stored document.
    pub fn clear(&self) {
        *self.document.write() = None;
    }
}

impl GraphStore for InMemoryGraphStore {
    type Error = StoreError;

    fn save(&self, graph: &FlightGraph) -> Result<(), Self::Error> {
        *self.document.write() = Some(node_link::export(graph));
        Ok(())
    }

    fn load(&self) -> Result<Option<FlightGraph>, Self::Error> {
        self.document().map(node_link::import).transpose()
    }
}
