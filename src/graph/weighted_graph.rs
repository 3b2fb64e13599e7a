use std::{collections::TryReserveError, convert::TryFrom, fmt, ops::Range};

use super::{GraphError, VertexIndex, Weight};

/// Fixed size weighted graph. All arcs live in one flat
/// array in which every vertex owns a contiguous block of
/// strictly ascending targets. Blocks are laid out in
/// vertex order without gaps.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct WeightedGraph {
    directed: bool,
    size: usize,
    /// Out-degree of each vertex.
    pub(super) degree: Vec<usize>,
    /// Offset of each vertex' block, `None` iff the degree is zero.
    pub(super) start: Vec<Option<usize>>,
    pub(super) targets: Vec<VertexIndex>,
    pub(super) weights: Vec<Weight>,
}

impl WeightedGraph {
    pub fn new(n: usize, directed: bool) -> Self {
        let reserved = if directed { n } else { 2 * n };
        WeightedGraph {
            directed,
            size: n,
            degree: vec![0; n],
            start: vec![None; n],
            targets: Vec::with_capacity(reserved),
            weights: Vec::with_capacity(reserved),
        }
    }

    /// Like `new`, but fails instead of aborting if the per vertex
    /// arrays can't be allocated. Nothing is reserved for arcs.
    pub fn try_new(n: usize, directed: bool) -> Result<Self, TryReserveError> {
        let mut degree = Vec::new();
        degree.try_reserve_exact(n)?;
        degree.resize(n, 0);

        let mut start = Vec::new();
        start.try_reserve_exact(n)?;
        start.resize(n, None);

        Ok(WeightedGraph {
            directed,
            size: n,
            degree,
            start,
            targets: Vec::new(),
            weights: Vec::new(),
        })
    }

    /// Build a graph from a list of weighted edges. Undirected
    /// edges are only listed once. Stops at the first edge
    /// that can't be added.
    pub fn from_arcs<I>(n: usize, directed: bool, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (VertexIndex, VertexIndex, Weight)>,
    {
        let mut graph = Self::new(n, directed);
        for (start, end, weight) in edges {
            graph.add_edge(start, end, weight)?;
        }
        Ok(graph)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of stored arcs, i.e. an undirected edge counts twice.
    pub fn number_arcs(&self) -> usize {
        self.targets.len()
    }

    pub fn number_edges(&self) -> usize {
        if self.directed {
            self.number_arcs()
        } else {
            self.number_arcs() / 2
        }
    }

    pub fn degree(&self, vertex: VertexIndex) -> Result<usize, GraphError> {
        Ok(self.degree[self.check_vertex(vertex)?])
    }

    pub fn has_edge(&self, start: VertexIndex, end: VertexIndex) -> bool {
        self.weight_of(start, end).is_some()
    }

    /// Weight of the arc (start,end) or `None` if there is no such arc.
    pub fn weight_of(&self, start: VertexIndex, end: VertexIndex) -> Option<Weight> {
        let start = self.check_vertex(start).ok()?;
        self.locate(start, end)
            .ok()
            .map(|offset| self.weights[offset])
    }

    /// Out-neighbours of a vertex with the weights of the
    /// connecting arcs, in ascending order of the neighbours.
    pub fn neighbors(
        &self,
        vertex: VertexIndex,
    ) -> Result<impl Iterator<Item = (VertexIndex, Weight)> + Clone + '_, GraphError> {
        let block = self.block(self.check_vertex(vertex)?);
        Ok(self.targets[block.clone()]
            .iter()
            .copied()
            .zip(self.weights[block].iter().copied()))
    }

    /// All arcs in the order in which they are stored.
    pub fn iterate_arcs(&self) -> impl Iterator<Item = (VertexIndex, VertexIndex, Weight)> + '_ {
        (0..self.size).flat_map(move |start| {
            let block = self.block(start);
            self.targets[block.clone()]
                .iter()
                .zip(self.weights[block].iter())
                .map(move |(end, weight)| (start as VertexIndex, *end, *weight))
        })
    }

    /// Like `iterate_arcs`, but undirected edges are only reported once
    /// with the smaller vertex first.
    pub fn iterate_edges(&self) -> impl Iterator<Item = (VertexIndex, VertexIndex, Weight)> + '_ {
        let directed = self.directed;
        self.iterate_arcs()
            .filter(move |(start, end, _)| directed || start < end)
    }

    pub fn add_edge(
        &mut self,
        start: VertexIndex,
        end: VertexIndex,
        weight: Weight,
    ) -> Result<(), GraphError> {
        let (start_vertex, end_vertex) = self.check_edge(start, end)?;

        // Both directions are checked before anything is touched.
        if self.has_arc(start_vertex, end) || (!self.directed && self.has_arc(end_vertex, start)) {
            tracing::debug!(start, end, "edge already exists, nothing added");
            return Err(GraphError::AlreadyExists(start, end));
        }

        self.insert_arc(start_vertex, end, weight);
        if !self.directed {
            self.insert_arc(end_vertex, start, weight);
        }
        Ok(())
    }

    pub fn remove_edge(&mut self, start: VertexIndex, end: VertexIndex) -> Result<(), GraphError> {
        let (start_vertex, end_vertex) = self.check_edge(start, end)?;

        if !self.has_arc(start_vertex, end) || (!self.directed && !self.has_arc(end_vertex, start))
        {
            tracing::debug!(start, end, "edge not found, nothing removed");
            return Err(GraphError::NotFound(start, end));
        }

        self.remove_arc(start_vertex, end);
        if !self.directed {
            self.remove_arc(end_vertex, start);
        }
        Ok(())
    }

    /// Change the weight of an existing edge in place.
    pub fn set_weight(
        &mut self,
        start: VertexIndex,
        end: VertexIndex,
        weight: Weight,
    ) -> Result<(), GraphError> {
        let (start_vertex, end_vertex) = self.check_edge(start, end)?;

        let forward = self.locate(start_vertex, end);
        let backward = if self.directed {
            None
        } else {
            Some(self.locate(end_vertex, start))
        };

        match (forward, backward) {
            (Ok(forward), None) => self.weights[forward] = weight,
            (Ok(forward), Some(Ok(backward))) => {
                self.weights[forward] = weight;
                self.weights[backward] = weight;
            }
            _ => {
                tracing::debug!(start, end, weight, "edge not found, weight not changed");
                return Err(GraphError::NotFound(start, end));
            }
        }
        Ok(())
    }

    /// Checks that the blocks are sorted, duplicate free, gapless
    /// and in vertex order and that undirected graphs are symmetric.
    pub fn check_valid(&self) -> bool {
        if self.degree.len() != self.size
            || self.start.len() != self.size
            || self.weights.len() != self.targets.len()
        {
            return false;
        }

        let mut next_block = 0;
        for vertex in 0..self.size {
            match self.start[vertex] {
                None if self.degree[vertex] == 0 => (),
                Some(start) if start == next_block && self.degree[vertex] > 0 => {
                    next_block += self.degree[vertex];
                    let block = match self.targets.get(start..next_block) {
                        Some(block) => block,
                        None => return false,
                    };
                    let ascending = block.windows(2).all(|pair| pair[0] < pair[1]);
                    let in_range = block
                        .iter()
                        .all(|end| self.check_vertex(*end).map_or(false, |end| end != vertex));
                    if !ascending || !in_range {
                        return false;
                    }
                }
                _ => return false,
            }
        }

        next_block == self.targets.len()
            && (self.directed
                || self
                    .iterate_arcs()
                    .all(|(start, end, weight)| self.weight_of(end, start) == Some(weight)))
    }

    fn check_vertex(&self, index: VertexIndex) -> Result<usize, GraphError> {
        usize::try_from(index)
            .ok()
            .filter(|vertex| *vertex < self.size)
            .ok_or(GraphError::InvalidVertex(index))
    }

    fn check_edge(
        &self,
        start: VertexIndex,
        end: VertexIndex,
    ) -> Result<(usize, usize), GraphError> {
        let start_vertex = self.check_vertex(start)?;
        let end_vertex = self.check_vertex(end)?;
        if start_vertex == end_vertex {
            return Err(GraphError::SelfLoop(start));
        }
        Ok((start_vertex, end_vertex))
    }

    fn block(&self, vertex: usize) -> Range<usize> {
        match self.start[vertex] {
            Some(start) => start..start + self.degree[vertex],
            None => 0..0,
        }
    }

    /// Offset of the arc (start,end) in the flat arrays, or the offset
    /// at which it would have to be inserted to keep the block sorted.
    fn locate(&self, start: usize, end: VertexIndex) -> Result<usize, usize> {
        let block = self.block(start);
        let base = block.start;
        self.targets[block]
            .binary_search(&end)
            .map(|offset| base + offset)
            .map_err(|offset| base + offset)
    }

    fn has_arc(&self, start: usize, end: VertexIndex) -> bool {
        self.locate(start, end).is_ok()
    }

    /// Insert an arc that is known to be absent.
    fn insert_arc(&mut self, start: usize, end: VertexIndex, weight: Weight) {
        let offset = match self.start[start] {
            Some(_) => self
                .locate(start, end)
                .unwrap_or_else(|insert_at| insert_at),
            None => {
                // New block goes right behind the closest preceding one.
                let offset = (0..start)
                    .rev()
                    .find_map(|previous| {
                        self.start[previous].map(|block| block + self.degree[previous])
                    })
                    .unwrap_or(0);
                self.start[start] = Some(offset);
                offset
            }
        };

        self.targets.insert(offset, end);
        self.weights.insert(offset, weight);
        for block in self.start[start + 1..].iter_mut().flatten() {
            *block += 1;
        }
        self.degree[start] += 1;
    }

    fn remove_arc(&mut self, start: usize, end: VertexIndex) {
        if let Ok(offset) = self.locate(start, end) {
            self.targets.remove(offset);
            self.weights.remove(offset);
            for block in self.start[start + 1..].iter_mut().flatten() {
                *block -= 1;
            }
            self.degree[start] -= 1;
            if self.degree[start] == 0 {
                self.start[start] = None;
            }
        }
    }
}

impl fmt::Display for WeightedGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.directed {
            "directed"
        } else {
            "undirected"
        };
        writeln!(
            f,
            "p edge {} {} {} {}",
            kind,
            self.size,
            self.number_edges(),
            self.directed as u8
        )?;

        for (start, end, weight) in self.iterate_edges() {
            writeln!(f, "e {} {} {}", start, end, weight)?;
        }

        Ok(())
    }
}
