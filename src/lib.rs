//! Core library functions for the Combo community detection engine
//!
//! A graph is turned into a modularity matrix, then the engine repeatedly
//! picks the best single move (split a community in two, merge two
//! communities, or shift vertices between them) until no move improves
//! modularity by more than [`THRESHOLD`].

pub mod config;
pub mod error;
pub mod data;
pub mod graph;
pub mod cluster;
pub mod storage;

/// Smallest modularity gain considered an improvement
pub const THRESHOLD: f64 = 1e-6;

pub use cluster::detection::{ComboAlgorithm, RunSummary};
pub use cluster::{
    detect_communities, execute, execute_from_file, execute_from_matrix, execute_from_petgraph,
    modularity_of, Partition, INVALID_MODULARITY,
};
pub use config::Config;
pub use error::GraphError;
pub use graph::{Edge, GraphBuilder, ModularityGraph};
