//! Service state and configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::graph::FlightGraph;
use crate::snapshot::SharedGraph;
use crate::store::GraphStore;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8002;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable output.
    Pretty,
}

/// Service configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Bind host (`HOST`).
    pub host: String,
    /// Bind port (`PORT`).
    pub port: u16,
    /// Node-link JSON loaded at start-up and written on `PUT /api/graph` (`GRAPH_PATH`).
    pub graph_path: Option<PathBuf>,
    /// Log format (`LOG_FORMAT`).
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            graph_path: None,
            log_format: LogFormat::Json,
        }
    }
}

impl ServiceConfig {
    /// Read configuration from environment variables.
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(port = %raw, "invalid PORT, using default");
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        Self {
            host: lookup("HOST").filter(|h| !h.is_empty()).unwrap_or(defaults.host),
            port,
            graph_path: lookup("GRAPH_PATH").filter(|p| !p.is_empty()).map(PathBuf::from),
            log_format,
        }
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Shared service state.
///
/// Contains the live graph and, optionally, the store that uploaded graphs
/// are persisted to.
pub struct ServiceState<S: GraphStore + 'static> {
    /// The graph being served.
    pub graph: Arc<SharedGraph>,
    /// Where uploaded graphs are saved.
    pub store: Option<Arc<S>>,
    /// Held across persist-then-swap so the store and the served graph agree.
    pub replace_lock: Arc<tokio::sync::Mutex<()>>,
    started_at: Instant,
}

impl<S: GraphStore + 'static> ServiceState<S> {
    /// Serve `graph` without persistence.
    pub fn new(graph: FlightGraph) -> Self {
        Self {
            graph: Arc::new(SharedGraph::new(graph)),
            store: None,
            replace_lock: Arc::new(tokio::sync::Mutex::new(())),
            started_at: Instant::now(),
        }
    }

    /// Serve `graph` and persist replacements to `store`.
    pub fn with_store(graph: FlightGraph, store: S) -> Self {
        Self {
            store: Some(Arc::new(store)),
            ..Self::new(graph)
        }
    }

    /// Seconds since the state was created.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl<S: GraphStore + 'static> Clone for ServiceState<S> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            store: self.store.clone(),
            replace_lock: Arc::clone(&self.replace_lock),
            started_at: self.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_addr().unwrap().port(), 8002);
    }

    #[test]
    fn test_config_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("GRAPH_PATH", "/data/graph.json"),
            ("LOG_FORMAT", "pretty"),
        ]));

        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.graph_path, Some(PathBuf::from("/data/graph.json")));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_bad_port_falls_back() {
        let config = ServiceConfig::from_lookup(lookup(&[("PORT", "eighty")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
