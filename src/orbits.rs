//! Orbit computation for weighted graphs. The actual work is
//! done by nauty or Traces on the vertex coloured encoding of
//! the graph, only the orbits of original vertices are kept.

use itertools::Itertools;
use nauty_Traces_sys::{
    densenauty, empty_graph, optionblk, sparsenauty, statsblk, SparseGraph, Traces,
    TracesOptions, TracesStats, ADDONEARC, FALSE, SETWORDSNEEDED, TRUE,
};
use std::{convert::TryInto, os::raw::c_int};

use crate::{
    graph::{EncodedGraph, VertexIndex, WeightedGraph},
    Error,
};

/// Orbit of each vertex, named by its smallest member.
pub type Orbits = Vec<VertexIndex>;
/// An orbit number together with the vertices in this orbit.
pub type OrbitEncoding = (VertexIndex, Vec<VertexIndex>);

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum EngineError {
    #[error("{engine} stopped with error status {status}")]
    Failed { engine: &'static str, status: c_int },
    #[error("Traces can't handle directed graphs")]
    DigraphUnsupported,
    #[error("expected {expected} orbit entries, got {found}")]
    OrbitCount { expected: usize, found: usize },
    #[error("encoded graph with {0} vertices or arcs is too large")]
    TooLarge(usize),
}

/// Anything that computes the orbits of the automorphism group
/// of a vertex coloured graph. The result holds one entry per
/// encoded vertex.
pub trait OrbitEngine {
    fn orbits(&self, encoded: &EncodedGraph<'_>) -> Result<Orbits, EngineError>;
}

/// Calls dense nauty.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenseNautyEngine;

/// Calls sparse nauty.
#[derive(Debug, Default, Clone, Copy)]
pub struct SparseNautyEngine;

/// Calls Traces (only for undirected graphs).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracesEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NautyTraces {
    Nauty,
    SparseNauty,
    Traces,
}

impl Default for NautyTraces {
    fn default() -> Self {
        Self::SparseNauty
    }
}

impl OrbitEngine for NautyTraces {
    fn orbits(&self, encoded: &EncodedGraph<'_>) -> Result<Orbits, EngineError> {
        match self {
            Self::Nauty => DenseNautyEngine.orbits(encoded),
            Self::SparseNauty => SparseNautyEngine.orbits(encoded),
            Self::Traces => TracesEngine.orbits(encoded),
        }
    }
}

/// Both nauty and Traces index everything with c_int.
fn check_size(encoded: &EncodedGraph<'_>) -> Result<usize, EngineError> {
    let n = encoded.vertex_count();
    let largest = n.max(encoded.arc_count());
    if largest > c_int::MAX as usize {
        return Err(EngineError::TooLarge(largest));
    }
    Ok(n)
}

fn check_status(engine: &'static str, status: c_int) -> Result<(), EngineError> {
    if status != 0 {
        return Err(EngineError::Failed { engine, status });
    }
    Ok(())
}

fn sparse_graph(encoded: &EncodedGraph<'_>) -> Result<SparseGraph, EngineError> {
    let n = encoded.vertex_count();
    let mut sparse_graph = SparseGraph::new(n, encoded.arc_count());

    sparse_graph.d.copy_from_slice(&encoded.degree);
    sparse_graph.e.copy_from_slice(&encoded.arcs);
    for (slot, start) in sparse_graph.v.iter_mut().zip(encoded.start.iter()) {
        *slot = (*start)
            .try_into()
            .map_err(|_| EngineError::TooLarge(*start))?;
    }

    Ok(sparse_graph)
}

impl OrbitEngine for DenseNautyEngine {
    fn orbits(&self, encoded: &EncodedGraph<'_>) -> Result<Orbits, EngineError> {
        let n = check_size(encoded)?;
        if n == 0 {
            return Ok(Orbits::new());
        }
        let m = SETWORDSNEEDED(n);

        let mut adjacency_matrix = empty_graph(m, n);
        for (vertex, (start, degree)) in encoded.start.iter().zip(encoded.degree.iter()).enumerate()
        {
            for end in encoded.arcs[*start..*start + *degree as usize].iter() {
                ADDONEARC(&mut adjacency_matrix, vertex, *end as usize, m);
            }
        }

        let mut options = optionblk::default();
        options.writeautoms = FALSE;
        options.defaultptn = FALSE;
        options.digraph = if encoded.digraph { TRUE } else { FALSE };
        let mut stats = statsblk::default();

        let mut vertex_order = encoded.vertex_order.clone();
        let mut partition = encoded.partition.clone();
        let mut orbits = vec![0; n];

        tracing::trace!(n, m, "calling dense nauty");
        // Safety: Call to nauty library function. All arrays have
        // length n and the adjacency matrix has n*m words.
        unsafe {
            densenauty(
                adjacency_matrix.as_mut_ptr(),
                vertex_order.as_mut_ptr(),
                partition.as_mut_ptr(),
                orbits.as_mut_ptr(),
                &mut options,
                &mut stats,
                m as c_int,
                n as c_int,
                std::ptr::null_mut(),
            );
        }

        check_status("dense nauty", stats.errstatus)?;
        Ok(orbits)
    }
}

impl OrbitEngine for SparseNautyEngine {
    fn orbits(&self, encoded: &EncodedGraph<'_>) -> Result<Orbits, EngineError> {
        let n = check_size(encoded)?;
        if n == 0 {
            return Ok(Orbits::new());
        }

        let mut sparse_graph = sparse_graph(encoded)?;

        let mut options = optionblk::default_sparse();
        options.writeautoms = FALSE;
        options.defaultptn = FALSE;
        options.digraph = if encoded.digraph { TRUE } else { FALSE };
        let mut stats = statsblk::default();

        let mut vertex_order = encoded.vertex_order.clone();
        let mut partition = encoded.partition.clone();
        let mut orbits = vec![0; n];

        tracing::trace!(n, arcs = encoded.arc_count(), "calling sparse nauty");
        // Safety: Call to nauty library function. The sparse graph
        // was built from a valid encoding, all arrays have length n.
        unsafe {
            sparsenauty(
                &mut (&mut sparse_graph).into(),
                vertex_order.as_mut_ptr(),
                partition.as_mut_ptr(),
                orbits.as_mut_ptr(),
                &mut options,
                &mut stats,
                std::ptr::null_mut(),
            );
        }

        check_status("sparse nauty", stats.errstatus)?;
        Ok(orbits)
    }
}

impl OrbitEngine for TracesEngine {
    fn orbits(&self, encoded: &EncodedGraph<'_>) -> Result<Orbits, EngineError> {
        if encoded.digraph {
            return Err(EngineError::DigraphUnsupported);
        }
        let n = check_size(encoded)?;
        if n == 0 {
            return Ok(Orbits::new());
        }

        let mut sparse_graph = sparse_graph(encoded)?;

        let mut options = TracesOptions::default();
        options.defaultptn = FALSE;
        options.digraph = FALSE;
        options.getcanon = FALSE;
        let mut stats = TracesStats::default();

        let mut vertex_order = encoded.vertex_order.clone();
        let mut partition = encoded.partition.clone();
        let mut orbits = vec![0; n];

        tracing::trace!(n, arcs = encoded.arc_count(), "calling Traces");
        // Safety: Call to Traces library function on an undirected
        // sparse graph, all arrays have length n.
        unsafe {
            Traces(
                &mut (&mut sparse_graph).into(),
                vertex_order.as_mut_ptr(),
                partition.as_mut_ptr(),
                orbits.as_mut_ptr(),
                &mut options,
                &mut stats,
                std::ptr::null_mut(),
            );
        }

        check_status("Traces", stats.errstatus)?;
        Ok(orbits)
    }
}

impl WeightedGraph {
    /// Compute the orbits of the weight preserving automorphisms
    /// of this graph with the given engine.
    pub fn compute_orbits<E>(&self, engine: &E) -> Result<Orbits, Error>
    where
        E: OrbitEngine + ?Sized,
    {
        if self.size() == 0 {
            return Ok(Orbits::new());
        }

        let encoded = EncodedGraph::from_graph(self);
        debug_assert!(encoded.check_valid());

        let orbits = engine.orbits(&encoded)?;
        if orbits.len() != encoded.vertex_count() {
            return Err(EngineError::OrbitCount {
                expected: encoded.vertex_count(),
                found: orbits.len(),
            }
            .into());
        }

        Ok(encoded.restrict_orbits(orbits))
    }
}

/// Group the vertices by their orbits, ordered by orbit number.
pub fn group_orbits(orbits: &[VertexIndex]) -> Vec<OrbitEncoding> {
    orbits
        .iter()
        .enumerate()
        .filter(|(_, orbit)| **orbit >= 0)
        .sorted_by(|(_, orbit_a), (_, orbit_b)| orbit_a.cmp(orbit_b))
        .group_by(|(_, orbit)| **orbit)
        .into_iter()
        .map(|(orbit_number, vertices)| {
            (
                orbit_number,
                vertices
                    .into_iter()
                    .map(|(vertex, _)| vertex as VertexIndex)
                    .collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod test {
    use crate::graph::GraphError;

    use super::*;

    const NAUTY_ENGINES: [NautyTraces; 2] = [NautyTraces::Nauty, NautyTraces::SparseNauty];
    const ALL_ENGINES: [NautyTraces; 3] = [
        NautyTraces::Nauty,
        NautyTraces::SparseNauty,
        NautyTraces::Traces,
    ];

    fn cycle(weights: &[i64]) -> Result<WeightedGraph, GraphError> {
        let n = weights.len();
        let edges = weights
            .iter()
            .enumerate()
            .map(|(start, weight)| (start as VertexIndex, ((start + 1) % n) as VertexIndex, *weight));
        WeightedGraph::from_arcs(n, false, edges)
    }

    #[test]
    fn test_weighted_triangle() -> Result<(), Error> {
        let mut graph = WeightedGraph::new(3, false);
        graph.add_edge(0, 1, 5)?;
        graph.add_edge(1, 2, 5)?;
        graph.add_edge(0, 2, 9)?;

        for engine in NAUTY_ENGINES.iter() {
            assert_eq!(vec![0, 1, 0], graph.compute_orbits(engine)?);
        }

        graph.set_weight(0, 2, 5)?;
        for engine in ALL_ENGINES.iter() {
            assert_eq!(vec![0, 0, 0], graph.compute_orbits(engine)?);
        }
        Ok(())
    }

    #[test]
    fn test_weighted_cycles() -> Result<(), Error> {
        let alternating = cycle(&[1, 2, 1, 2])?;
        let broken = cycle(&[1, 1, 2, 3])?;

        for engine in NAUTY_ENGINES.iter() {
            assert_eq!(vec![0, 0, 0, 0], alternating.compute_orbits(engine)?);
            assert_eq!(vec![0, 1, 2, 3], broken.compute_orbits(engine)?);
        }
        Ok(())
    }

    #[test]
    fn test_directed_path() -> Result<(), Error> {
        let graph = WeightedGraph::from_arcs(3, true, vec![(0, 1, 1), (1, 2, 1)])?;
        for engine in NAUTY_ENGINES.iter() {
            assert_eq!(vec![0, 1, 2], graph.compute_orbits(engine)?);
        }

        let star = WeightedGraph::from_arcs(4, true, vec![(0, 1, 2), (0, 2, 2), (0, 3, 7)])?;
        for engine in NAUTY_ENGINES.iter() {
            assert_eq!(vec![0, 1, 1, 3], star.compute_orbits(engine)?);
        }
        Ok(())
    }

    #[test]
    fn test_trivial_graphs() -> Result<(), Error> {
        let empty = WeightedGraph::new(0, false);
        let isolated = WeightedGraph::new(3, false);

        for engine in ALL_ENGINES.iter() {
            assert!(empty.compute_orbits(engine)?.is_empty());
            assert_eq!(vec![0, 0, 0], isolated.compute_orbits(engine)?);
        }
        Ok(())
    }

    #[test]
    fn test_traces_rejects_digraphs() -> Result<(), Error> {
        let graph = cycle(&[1, 2, 1, 2])?;
        let result = graph.compute_orbits(&TracesEngine);
        assert!(matches!(
            result,
            Err(Error::Canonicalization(EngineError::DigraphUnsupported))
        ));
        Ok(())
    }

    struct BrokenEngine;

    impl OrbitEngine for BrokenEngine {
        fn orbits(&self, _encoded: &EncodedGraph<'_>) -> Result<Orbits, EngineError> {
            Ok(vec![0])
        }
    }

    #[test]
    fn test_wrong_orbit_count() -> Result<(), Error> {
        let graph = cycle(&[3, 3, 3])?;
        let result = graph.compute_orbits(&BrokenEngine);
        assert!(matches!(
            result,
            Err(Error::Canonicalization(EngineError::OrbitCount {
                expected: 3,
                found: 1
            }))
        ));
        Ok(())
    }

    #[test]
    fn test_group_orbits() {
        let orbits = vec![0, 1, 0, 3, 1, 0];
        assert_eq!(
            vec![(0, vec![0, 2, 5]), (1, vec![1, 4]), (3, vec![3])],
            group_orbits(&orbits)
        );
    }
}
