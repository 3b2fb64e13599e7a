//! Representation of weighted graphs in a compact
//! sparse row layout as well as their translation
//! into vertex coloured graphs understood by nauty.
use std::os::raw::c_int;

mod weighted_graph;
pub use weighted_graph::WeightedGraph;

mod encoded_graph;
pub use encoded_graph::{encode_colours, EncodedGraph, EncodedVertex, EncodingPath};

pub type VertexIndex = c_int;
pub type Weight = i64;

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum GraphError {
    #[error("edge ({0},{1}) is already part of the graph")]
    AlreadyExists(VertexIndex, VertexIndex),
    #[error("edge ({0},{1}) is not part of the graph")]
    NotFound(VertexIndex, VertexIndex),
    #[error("vertex {0} is not part of the graph")]
    InvalidVertex(VertexIndex),
    #[error("self-loop at vertex {0} is not supported")]
    SelfLoop(VertexIndex),
}
