//! Error types for graph construction and community bookkeeping

use thiserror::Error;

/// Errors raised while building a modularity graph or installing a partition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// An edge endpoint does not fit the declared vertex count
    #[error("vertex index {index} is out of range for a graph of size {size}")]
    VertexOutOfRange { index: usize, size: usize },

    /// A matrix row has a different length than the number of rows
    #[error("matrix must be square: row {row} has {found} entries, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A per-vertex array does not match the graph size
    #[error("expected {expected} community labels, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// The vertex count does not fit a dense N x N matrix
    #[error("graph with {size} vertices is too large for a dense modularity matrix (limit {limit})")]
    TooLarge { size: u128, limit: usize },

    /// The graph has no vertices
    #[error("graph is empty")]
    EmptyGraph,
}

pub type Result<T> = std::result::Result<T, GraphError>;
