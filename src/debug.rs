//! Debug facilities.
use std::io::{self, Write};

use crate::{
    graph::{GraphError, WeightedGraph},
    orbits::{group_orbits, EngineError},
};

// Error types and From<...> implementations

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Graph manipulation error: {0}")]
    Graph(GraphError),
    #[error("Malformed input on line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },
    #[error("Edge on line {line} rejected: {source}")]
    EdgeRejected { line: usize, source: GraphError },
    #[error("Error while reading or writing a graph")]
    Io(io::Error),
    #[error("Canonicalization failed: {0}")]
    Canonicalization(EngineError),
}

impl From<GraphError> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ge: GraphError) -> Self {
        Self::Graph(ge)
    }
}

impl From<io::Error> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ie: io::Error) -> Self {
        Self::Io(ie)
    }
}

impl From<EngineError> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ee: EngineError) -> Self {
        Self::Canonicalization(ee)
    }
}

// Output of graphs and orbits

/// Write the graph in the same edge list format the parser reads.
pub fn write_graph_dimacs(writer: &mut impl Write, graph: &WeightedGraph) -> Result<(), Error> {
    write!(writer, "{}", graph)?;
    writer.flush().map_err(Error::from)
}

/// Print orbits like nauty does: members of each orbit followed by
/// its size. Orbits with a single vertex only if `print_trivial`.
pub fn write_orbits_nauty_style(
    writer: &mut impl Write,
    orbits: &[crate::graph::VertexIndex],
    print_trivial: bool,
) -> Result<(), Error> {
    let grouped = group_orbits(orbits);
    writeln!(writer, "{} orbits", grouped.len())?;

    for (orbit, members) in grouped {
        if members.len() > 1 {
            for member in members.iter() {
                write!(writer, "{} ", member)?;
            }
            write!(writer, "({}); ", members.len())?;
        } else if print_trivial {
            write!(writer, "{}; ", orbit)?;
        }
    }

    // Force new line and flush everything out.
    writeln!(writer)?;
    writer.flush().map_err(Error::from)
}

// Debug macros that allow to time single expressions

#[macro_export]
macro_rules! time {
    ($i:ident, $ret:ident, $exp:expr) => {
        let before = std::time::Instant::now();
        let $ret = $exp;
        let $i = before.elapsed();
    };
}
