//! Modularity graph construction from edges, dense matrices and petgraph graphs

use crate::error::{GraphError, Result};
use crate::graph::matrix::{is_symmetric, symmetrize};
use crate::graph::ModularityGraph;
use ndarray::{Array1, Array2, Axis};
use petgraph::graph::{Graph, IndexType};
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;

/// Weighted edge `(source, destination, weight)`
pub type Edge = (usize, usize, f64);

/// Largest vertex count whose dense matrix is allocated (32 GiB of f64)
pub const MAX_VERTICES: usize = 1 << 16;

fn check_size(size: usize) -> Result<()> {
    if size > MAX_VERTICES {
        return Err(GraphError::TooLarge {
            size: size as u128,
            limit: MAX_VERTICES,
        });
    }
    Ok(())
}

fn check_vertex_range(size: usize, edges: &[Edge]) -> Result<()> {
    match edges.iter().map(|&(s, d, _)| s.max(d)).max() {
        Some(index) if index >= size => Err(GraphError::VertexOutOfRange { index, size }),
        _ => Ok(()),
    }
}

/// Subtract the null model `resolution * out(i) * in(j)` in place
fn subtract_null_model(
    matrix: &mut Array2<f64>,
    out_strength: &Array1<f64>,
    in_strength: &Array1<f64>,
    resolution: f64,
) {
    for ((i, j), value) in matrix.indexed_iter_mut() {
        *value -= resolution * out_strength[i] * in_strength[j];
    }
}

impl ModularityGraph {
    /// Build from weighted edge triples
    ///
    /// Raw weights are normalized by the total weight (doubled when
    /// undirected) and the null model is subtracted. With
    /// `treat_as_modularity` the weights are used as modularity entries
    /// directly. Multi-edges and self-loops accumulate.
    pub fn from_edges(
        size: usize,
        edges: &[Edge],
        directed: bool,
        resolution: f64,
        treat_as_modularity: bool,
    ) -> Result<Self> {
        check_size(size)?;
        check_vertex_range(size, edges)?;
        let mut matrix = Array2::zeros((size, size));

        if treat_as_modularity {
            for &(source, destination, weight) in edges {
                if directed {
                    matrix[[source, destination]] += weight;
                } else {
                    matrix[[source, destination]] += weight / 2.0;
                    matrix[[destination, source]] += weight / 2.0;
                }
            }
        } else {
            let mut total_weight: f64 = edges.iter().map(|&(_, _, weight)| weight).sum();
            if !directed {
                total_weight *= 2.0;
            }
            // all-zero weights leave a zero kernel
            if total_weight != 0.0 {
                let mut out_strength = Array1::zeros(size);
                let mut in_strength = Array1::zeros(size);
                for &(source, destination, weight) in edges {
                    let weight = weight / total_weight;
                    matrix[[source, destination]] += weight;
                    out_strength[source] += weight;
                    in_strength[destination] += weight;
                    if !directed {
                        matrix[[destination, source]] += weight;
                        out_strength[destination] += weight;
                        in_strength[source] += weight;
                    }
                }
                subtract_null_model(&mut matrix, &out_strength, &in_strength, resolution);
            }
        }

        if directed {
            symmetrize(&mut matrix);
        }
        Ok(Self::from_parts(matrix, resolution, directed))
    }

    /// Build from a dense square matrix
    ///
    /// An asymmetric matrix is always handled as directed.
    pub fn from_matrix(
        matrix: Array2<f64>,
        directed: bool,
        resolution: f64,
        treat_as_modularity: bool,
    ) -> Result<Self> {
        let size = matrix.nrows();
        check_size(size)?;
        if matrix.ncols() != size {
            return Err(GraphError::NonSquareMatrix {
                row: 0,
                expected: size,
                found: matrix.ncols(),
            });
        }
        let directed = directed || !is_symmetric(&matrix.view());

        let mut modularity_matrix = if treat_as_modularity {
            matrix
        } else {
            let mut total_weight = matrix.sum();
            // self-loops count twice in undirected graphs
            if !directed {
                total_weight += matrix.diag().sum();
            }
            let mut normalized = matrix;
            if total_weight != 0.0 {
                normalized /= total_weight;
                if !directed {
                    normalized.diag_mut().mapv_inplace(|value| value * 2.0);
                }
                let out_strength = normalized.sum_axis(Axis(1));
                let in_strength = normalized.sum_axis(Axis(0));
                subtract_null_model(&mut normalized, &out_strength, &in_strength, resolution);
            }
            normalized
        };

        if directed {
            symmetrize(&mut modularity_matrix);
        }
        Ok(Self::from_parts(modularity_matrix, resolution, directed))
    }

    /// Build from row vectors, rejecting ragged input
    pub fn from_rows(
        rows: &[Vec<f64>],
        directed: bool,
        resolution: f64,
        treat_as_modularity: bool,
    ) -> Result<Self> {
        let size = rows.len();
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(GraphError::NonSquareMatrix {
                row,
                expected: size,
                found: values.len(),
            });
        }
        let matrix = Array2::from_shape_fn((size, size), |(i, j)| rows[i][j]);
        Self::from_matrix(matrix, directed, resolution, treat_as_modularity)
    }
}

/// Build a modularity graph from a petgraph graph
///
/// Node indices become vertex ids and the graph's own directedness is used.
pub fn from_petgraph<N, E, Ty, Ix, F>(
    graph: &Graph<N, E, Ty, Ix>,
    weight: F,
    resolution: f64,
    treat_as_modularity: bool,
) -> Result<ModularityGraph>
where
    Ty: EdgeType,
    Ix: IndexType,
    F: Fn(&E) -> f64,
{
    let edges: Vec<Edge> = graph
        .edge_references()
        .map(|edge| (edge.source().index(), edge.target().index(), weight(edge.weight())))
        .collect();
    ModularityGraph::from_edges(
        graph.node_count(),
        &edges,
        graph.is_directed(),
        resolution,
        treat_as_modularity,
    )
}

/// Builder accumulating edges over arbitrary integer vertex ids
///
/// Ids are shifted on [`build`](GraphBuilder::build) so the smallest seen id
/// becomes vertex 0.
pub struct GraphBuilder {
    /// Edges with their original ids
    edges: Vec<(i64, i64, f64)>,

    /// Smallest and largest id seen so far
    id_range: Option<(i64, i64)>,

    directed: bool,
    resolution: f64,
    treat_as_modularity: bool,
}

impl GraphBuilder {
    /// Create a new graph builder with the given edge capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            edges: Vec::with_capacity(capacity),
            id_range: None,
            directed: false,
            resolution: 1.0,
            treat_as_modularity: false,
        }
    }

    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    pub fn resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn treat_as_modularity(mut self, treat_as_modularity: bool) -> Self {
        self.treat_as_modularity = treat_as_modularity;
        self
    }

    pub fn set_directed(&mut self, directed: bool) {
        self.directed = directed;
    }

    /// Register a vertex id without edges
    pub fn add_vertex(&mut self, id: i64) {
        self.id_range = Some(match self.id_range {
            Some((min, max)) => (min.min(id), max.max(id)),
            None => (id, id),
        });
    }

    /// Add a weighted edge between two vertex ids
    pub fn add_edge(&mut self, source: i64, destination: i64, weight: f64) {
        self.add_vertex(source);
        self.add_vertex(destination);
        self.edges.push((source, destination, weight));
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Build the modularity graph
    pub fn build(self) -> Result<ModularityGraph> {
        let (min_id, max_id) = self.id_range.ok_or(GraphError::EmptyGraph)?;
        // the span of two i64 ids always fits u64, the vertex count may not fit usize
        let span = u128::from(max_id.abs_diff(min_id)) + 1;
        let size = usize::try_from(span)
            .ok()
            .filter(|&size| size <= MAX_VERTICES)
            .ok_or(GraphError::TooLarge {
                size: span,
                limit: MAX_VERTICES,
            })?;
        let edges: Vec<Edge> = self
            .edges
            .iter()
            .map(|&(s, d, w)| (s.abs_diff(min_id) as usize, d.abs_diff(min_id) as usize, w))
            .collect();
        ModularityGraph::from_edges(
            size,
            &edges,
            self.directed,
            self.resolution,
            self.treat_as_modularity,
        )
    }
}
