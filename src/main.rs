#![warn(rust_2018_idioms)]

//! Compute the orbits of the weight preserving automorphisms
//! of a weighted graph given as an edge list file.

use clap::{Parser, ValueEnum};
use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

use swg::{
    parse_edge_list_input, time, write_graph_dimacs, write_orbits_nauty_style, Error,
    NautyTraces, Settings,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Engine {
    /// Dense nauty
    Nauty,
    /// Sparse nauty
    SparseNauty,
    /// Traces (only for undirected graphs with uniform weights)
    Traces,
}

impl From<Engine> for NautyTraces {
    fn from(engine: Engine) -> Self {
        match engine {
            Engine::Nauty => Self::Nauty,
            Engine::SparseNauty => Self::SparseNauty,
            Engine::Traces => Self::Traces,
        }
    }
}

/// Orbits of weighted graphs via nauty and Traces.
#[derive(Parser, Debug)]
#[command(name = "swg", about = "Orbits of weighted graphs via nauty and Traces")]
struct Cli {
    /// Graph file in the `p edge` / `e i j w` edge list format.
    graph_file: PathBuf,

    /// Engine that computes the orbits.
    #[arg(short, long, value_enum, default_value = "sparse-nauty")]
    engine: Engine,

    /// Also print orbits with a single vertex.
    #[arg(short, long)]
    trivial: bool,

    /// Write the parsed graph to stdout before computing orbits.
    #[arg(short, long)]
    dump: bool,
}

impl From<&Cli> for Settings {
    fn from(cli: &Cli) -> Self {
        Settings {
            nauty_or_traces: cli.engine.into(),
            print_trivial: cli.trivial,
            dump_graph: cli.dump,
        }
    }
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from(&cli);

    let file = File::open(&cli.graph_file)?;
    time!(
        parse_time,
        graph,
        parse_edge_list_input(BufReader::new(file))
    );
    let graph = graph?;
    tracing::info!(
        vertices = graph.size(),
        edges = graph.number_edges(),
        directed = graph.is_directed(),
        ?parse_time,
        "Graph loaded"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if settings.dump_graph {
        write_graph_dimacs(&mut out, &graph)?;
    }

    time!(
        orbit_time,
        orbits,
        graph.compute_orbits(&settings.nauty_or_traces)
    );
    let orbits = orbits?;
    tracing::info!(engine = ?settings.nauty_or_traces, ?orbit_time, "Orbits computed");

    write_orbits_nauty_style(&mut out, &orbits, settings.print_trivial)
}
