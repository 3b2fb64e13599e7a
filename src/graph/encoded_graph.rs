use custom_debug_derive::Debug;
use itertools::{Itertools, MinMaxResult};
use std::{convert::TryFrom, os::raw::c_int};

use super::{VertexIndex, Weight, WeightedGraph};
use crate::orbits::Orbits;

/// Turn colours given in label order into a nauty partition,
/// i.e. 0 marks the last vertex of each colour cell and 1 all others.
/// Vertices of the same colour have to be next to each other.
pub fn encode_colours<C: PartialEq>(colours: &[C]) -> Vec<c_int> {
    let mut last_colour = None;
    let mut partition = colours
        .iter()
        .rev()
        .map(|colour| {
            if last_colour != Some(colour) {
                last_colour = Some(colour);
                0
            } else {
                1
            }
        })
        .collect::<Vec<c_int>>();
    partition.reverse();
    partition
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingPath {
    /// All arcs share one weight, the arcs are taken as they are.
    Uniform,
    /// Each arc is subdivided by an auxiliary vertex coloured by its weight.
    General,
}

/// Vertex of an encoded graph. Ids below the size of the weighted
/// graph are its original vertices, all others stand for one arc each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedVertex {
    Original(VertexIndex),
    /// Index of the arc in the flat arc array of the weighted graph.
    Auxiliary(usize),
}

/// Unweighted vertex coloured graph in sparse row layout whose
/// automorphisms are exactly the weight preserving automorphisms
/// of the weighted graph it was built from. Borrows that graph,
/// so the graph can't change while an encoding of it is around.
#[derive(Debug)]
pub struct EncodedGraph<'a> {
    #[debug(skip)]
    graph: &'a WeightedGraph,
    pub path: EncodingPath,
    /// Whether the encoded arcs have to be read as directed.
    pub digraph: bool,
    pub degree: Vec<c_int>,
    pub start: Vec<usize>,
    pub arcs: Vec<VertexIndex>,
    /// lab
    pub vertex_order: Vec<VertexIndex>,
    /// ptn aka the colouring
    pub partition: Vec<c_int>,
}

impl<'a> EncodedGraph<'a> {
    pub fn from_graph(graph: &'a WeightedGraph) -> Self {
        debug_assert!(graph.check_valid());

        let path = match graph.weights.iter().minmax() {
            MinMaxResult::MinMax(min, max) if min != max => EncodingPath::General,
            _ => EncodingPath::Uniform,
        };
        tracing::debug!(
            ?path,
            vertices = graph.size(),
            arcs = graph.number_arcs(),
            "encoding weighted graph"
        );

        match path {
            EncodingPath::Uniform => Self::uniform(graph),
            EncodingPath::General => Self::subdivided(graph),
        }
    }

    fn uniform(graph: &'a WeightedGraph) -> Self {
        let n = graph.size();
        let colours = vec![None::<Weight>; n];

        EncodedGraph {
            graph,
            path: EncodingPath::Uniform,
            digraph: graph.is_directed(),
            degree: graph.degree.iter().map(|degree| *degree as c_int).collect(),
            start: graph
                .start
                .iter()
                .map(|start| start.unwrap_or(0))
                .collect(),
            arcs: graph.targets.clone(),
            vertex_order: (0..n as VertexIndex).collect(),
            partition: encode_colours(&colours),
        }
    }

    fn subdivided(graph: &'a WeightedGraph) -> Self {
        let n = graph.size();
        let arc_number = graph.number_arcs();
        let encoded_size = n + arc_number;

        // Original vertices keep their blocks but point to the auxiliary
        // vertex of each arc which in turn points to the arc's target.
        let mut degree = graph
            .degree
            .iter()
            .map(|degree| *degree as c_int)
            .collect::<Vec<_>>();
        degree.resize(encoded_size, 1);

        let mut start = graph
            .start
            .iter()
            .map(|start| start.unwrap_or(0))
            .collect::<Vec<_>>();
        start.extend(arc_number..2 * arc_number);

        let mut arcs = (n..encoded_size)
            .map(|auxiliary| auxiliary as VertexIndex)
            .collect::<Vec<_>>();
        arcs.extend_from_slice(&graph.targets);

        let weight_of = |vertex: VertexIndex| {
            let vertex = vertex as usize;
            if vertex < n {
                None
            } else {
                Some(graph.weights[vertex - n])
            }
        };

        // Stable, so auxiliary vertices of equal weight stay in arc order.
        let mut vertex_order = (0..encoded_size as VertexIndex).collect::<Vec<_>>();
        vertex_order[n..].sort_by_key(|auxiliary| weight_of(*auxiliary));

        let colours = vertex_order
            .iter()
            .map(|vertex| weight_of(*vertex))
            .collect::<Vec<_>>();

        EncodedGraph {
            graph,
            path: EncodingPath::General,
            digraph: true,
            degree,
            start,
            arcs,
            vertex_order,
            partition: encode_colours(&colours),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.degree.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    pub fn classify(&self, vertex: VertexIndex) -> Option<EncodedVertex> {
        let index = usize::try_from(vertex).ok()?;
        if index < self.graph.size() {
            Some(EncodedVertex::Original(vertex))
        } else if index < self.vertex_count() {
            Some(EncodedVertex::Auxiliary(index - self.graph.size()))
        } else {
            None
        }
    }

    /// Drop the orbits of auxiliary vertices.
    pub fn restrict_orbits(&self, mut orbits: Orbits) -> Orbits {
        orbits.truncate(self.graph.size());
        orbits
    }

    /// Colour cells of the initial partition in label order.
    pub fn colour_cells(&self) -> Vec<&[VertexIndex]> {
        let mut cells = Vec::new();
        let mut cell_start = 0;
        for (position, marker) in self.partition.iter().enumerate() {
            if *marker == 0 {
                cells.push(&self.vertex_order[cell_start..=position]);
                cell_start = position + 1;
            }
        }
        cells
    }

    pub fn check_valid(&self) -> bool {
        let n = self.vertex_count();

        let blocks_valid = self
            .start
            .iter()
            .zip(self.degree.iter())
            .all(|(start, degree)| *degree >= 0 && start + *degree as usize <= self.arc_count());
        let arcs_valid = self
            .arcs
            .iter()
            .all(|end| (*end as usize) < n && *end >= 0);
        let order_valid = self.vertex_order.iter().sorted().copied().eq(0..n as VertexIndex);

        self.start.len() == n
            && self.partition.len() == n
            && self.partition.last().map_or(true, |marker| *marker == 0)
            && blocks_valid
            && arcs_valid
            && order_valid
    }
}
