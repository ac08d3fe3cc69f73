//! Flight network command line.
//!
//! ```bash
//! flight_network build --airports airports.csv --routes routes.csv --out flight_network.json
//! flight_network route HAN SGN --mode distance
//! flight_network paths HAN SGN --max-hops 2
//! flight_network metrics
//! flight_network hubs --top 10
//! ```
//!
//! Logs go to stderr; `RUST_LOG` and `LOG_FORMAT=json|pretty` control them.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flight_network_kernel::{
    all_simple_paths, betweenness_centrality, busiest_airports, graph_metrics, shortest_path_by_distance,
    shortest_path_by_hops, tables, top_hubs, FlightGraph, GraphBuilder, GraphMetrics, GraphStore,
    JsonFileStore, RouteSummary,
};

const DEFAULT_GRAPH: &str = "flight_network.json";

#[derive(Parser)]
#[command(name = "flight_network", version, about = "Build and query flight route networks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a graph from airport and route tables and export it
    Build {
        /// Airport table (iata_code, airport_name, country, latitude, longitude)
        #[arg(long, value_name = "CSV")]
        airports: PathBuf,
        /// Route table (departure_iata, arrival_iata, airline_iata, flight_number)
        #[arg(long, value_name = "CSV")]
        routes: PathBuf,
        /// Node-link JSON output
        #[arg(long, default_value = DEFAULT_GRAPH)]
        out: PathBuf,
        /// Number of hubs to print
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Shortest route between two airports
    Route {
        from: String,
        to: String,
        #[arg(long, value_enum, default_value_t = Mode::Hops)]
        mode: Mode,
        #[command(flatten)]
        graph: GraphArg,
    },
    /// List simple paths between two airports
    Paths {
        from: String,
        to: String,
        /// Maximum routes per path
        #[arg(long, default_value_t = 3)]
        max_hops: usize,
        /// Maximum paths printed
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[command(flatten)]
        graph: GraphArg,
    },
    /// Print graph metrics
    Metrics {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        graph: GraphArg,
    },
    /// Rank airports by betweenness centrality and by route count
    Hubs {
        #[arg(long, default_value_t = 10)]
        top: usize,
        #[command(flatten)]
        graph: GraphArg,
    },
}

#[derive(clap::Args)]
struct GraphArg {
    /// Node-link JSON graph
    #[arg(long = "graph", env = "GRAPH_PATH", default_value = DEFAULT_GRAPH)]
    path: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Fewest hops, then shortest distance
    Hops,
    /// Shortest distance
    Distance,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    let pretty = std::env::var("LOG_FORMAT").map(|f| f == "pretty").unwrap_or(false);

    if !pretty {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load(path: &Path) -> Result<FlightGraph, Box<dyn std::error::Error>> {
    JsonFileStore::new(path)
        .load()?
        .ok_or_else(|| format!("graph file not found: {}", path.display()).into())
}

fn require(graph: &FlightGraph, code: &str) -> Result<(), Box<dyn std::error::Error>> {
    if graph.contains(code) {
        Ok(())
    } else {
        Err(format!("unknown airport: {}", code).into())
    }
}

fn print_metrics(metrics: &GraphMetrics) {
    println!("Density: {:.6}", metrics.density);
    println!("Average degree: {:.4}", metrics.average_degree);
    match metrics.diameter {
        Some(d) => println!("Diameter: {}", d),
        None => println!("Diameter: n/a"),
    }
    println!(
        "Weakly connected components: {} (largest {})",
        metrics.weak_components, metrics.largest_component
    );
}

fn print_summary(summary: &RouteSummary) {
    let path: Vec<&str> = summary.path.iter().map(|c| c.as_str()).collect();
    println!("{}  ({} hops, {:.1} km)", path.join(" -> "), summary.hops, summary.distance_km);
}

fn print_hubs(graph: &FlightGraph, top: usize) {
    println!("Top {} hubs by betweenness centrality:", top);
    for (rank, hub) in top_hubs(&betweenness_centrality(graph), top).iter().enumerate() {
        println!("{:>3}. {:<5} {:.6}", rank + 1, hub.code, hub.score);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            airports,
            routes,
            out,
            top,
        } => {
            let airports = tables::read_airports_path(&airports)?;
            let routes = tables::read_routes_path(&routes)?;
            let (graph, report) = GraphBuilder::build_with_report(airports, routes);
            info!(
                skipped_airports = report.skipped_airports.len(),
                skipped_routes = report.skipped_routes.len(),
                "tables loaded"
            );

            println!("Nodes: {}", graph.num_airports());
            println!("Edges: {}", graph.num_routes());
            print_metrics(&graph_metrics(&graph));
            print_hubs(&graph, top);

            JsonFileStore::new(&out).save(&graph)?;
            println!("Graph written to {}", out.display());
        }
        Command::Route { from, to, mode, graph } => {
            let graph = load(&graph.path)?;
            require(&graph, &from)?;
            require(&graph, &to)?;

            let path = match mode {
                Mode::Hops => shortest_path_by_hops(&graph, &from, &to),
                Mode::Distance => shortest_path_by_distance(&graph, &from, &to),
            };
            match path.and_then(|p| RouteSummary::from_path(&graph, p)) {
                Some(summary) => print_summary(&summary),
                None => println!("No route from {} to {}", from, to),
            }
        }
        Command::Paths {
            from,
            to,
            max_hops,
            limit,
            graph,
        } => {
            let graph = load(&graph.path)?;
            require(&graph, &from)?;
            require(&graph, &to)?;

            let mut count = 0;
            for summary in all_simple_paths(&graph, &from, &to, Some(max_hops))
                .filter_map(|p| RouteSummary::from_path(&graph, p))
                .take(limit)
            {
                print_summary(&summary);
                count += 1;
            }
            println!("{} path(s) within {} hops", count, max_hops);
        }
        Command::Metrics { json, graph } => {
            let graph = load(&graph.path)?;
            let metrics = graph_metrics(&graph);
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                println!("Nodes: {}", metrics.airports);
                println!("Edges: {}", metrics.routes);
                print_metrics(&metrics);
            }
        }
        Command::Hubs { top, graph } => {
            let graph = load(&graph.path)?;
            print_hubs(&graph, top);

            println!("Top {} airports by route count:", top);
            for (rank, airport) in busiest_airports(&graph, top).iter().enumerate() {
                println!(
                    "{:>3}. {:<5} {} ({} out, {} in)",
                    rank + 1,
                    airport.code,
                    airport.total_routes,
                    airport.departures,
                    airport.arrivals
                );
            }
        }
    }

    Ok(())
}
