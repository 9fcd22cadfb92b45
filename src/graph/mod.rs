//! Graph model: modularity matrix, community assignment and construction

pub mod builder;
pub mod matrix;
pub mod modularity;

pub use builder::{from_petgraph, Edge, GraphBuilder};
pub use modularity::ModularityGraph;
