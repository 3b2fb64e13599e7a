#![warn(rust_2018_idioms)]
//#![deny(warnings, missing_docs)]

//! Compact storage for weighted graphs and their
//! translation into vertex coloured graphs, so that
//! nauty or Traces can compute the orbits of the
//! weight preserving automorphisms.

pub mod graph;
pub use graph::{EncodedGraph, GraphError, VertexIndex, Weight, WeightedGraph};

pub mod orbits;
pub use orbits::{EngineError, NautyTraces, OrbitEngine, Orbits};

pub mod parser;
pub use parser::parse_edge_list_input;

mod debug;
pub use debug::{write_graph_dimacs, write_orbits_nauty_style, Error};

/// What the command line tool should do.
#[derive(Debug, Default)]
pub struct Settings {
    /// Engine that computes the orbits.
    pub nauty_or_traces: NautyTraces,
    /// Also print orbits of size one.
    pub print_trivial: bool,
    /// Write the parsed graph back out before computing orbits.
    pub dump_graph: bool,
}
