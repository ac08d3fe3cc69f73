//! Node-link JSON files on disk.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{node_link, GraphStore, StoreError};
use crate::graph::FlightGraph;

/// Stores a graph as a pretty-printed node-link JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GraphStore for JsonFileStore {
    type Error = StoreError;

    fn save(&self, graph: &FlightGraph) -> Result<(), Self::Error> {
        let json = node_link::to_json(graph)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;

        info!(
            path = %self.path.display(),
            airports = graph.num_airports(),
            routes = graph.num_routes(),
            "graph exported"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<FlightGraph>, Self::Error> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored graph");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        node_link::from_json(&json).map(Some)
    }
}
