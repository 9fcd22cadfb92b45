//! Community detection module

pub mod bisection;
pub mod detection;
pub mod metrics;
pub mod moves;

use crate::config::Config;
use crate::error::GraphError;
use crate::graph::{from_petgraph, Edge, ModularityGraph};
use detection::{ComboAlgorithm, RunSummary};
use petgraph::graph::{Graph, IndexType};
use petgraph::EdgeType;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;

/// Modularity reported for rejected or empty input
pub const INVALID_MODULARITY: f64 = -1.0;

/// Final assignment returned to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    /// Community id per vertex, dense from 0
    pub communities: Vec<usize>,

    /// Modularity of the assignment
    pub modularity: f64,
}

impl Partition {
    /// Result for input that could not be partitioned
    pub fn invalid() -> Self {
        Self {
            communities: Vec::new(),
            modularity: INVALID_MODULARITY,
        }
    }

    /// Snapshot of a graph's current assignment
    pub fn from_graph(graph: &ModularityGraph) -> Self {
        Self {
            communities: graph.communities().to_vec(),
            modularity: graph.modularity(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.communities.is_empty()
    }

    pub fn number_of_communities(&self) -> usize {
        self.communities.iter().max().map_or(0, |&max| max + 1)
    }
}

/// A community of the final partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    /// Community label
    pub id: usize,

    /// Member vertices in index order
    pub members: Vec<usize>,

    /// Number of members
    pub size: usize,

    /// Sum of modularity entries over member pairs
    pub modularity_contribution: f64,
}

/// Run the engine on a constructed graph
pub fn detect_communities(
    graph: &mut ModularityGraph,
    config: &Config,
) -> Result<RunSummary, GraphError> {
    if graph.is_empty() {
        return Err(GraphError::EmptyGraph);
    }
    let mut combo = ComboAlgorithm::from_config(config);
    Ok(combo.run(graph, config.max_communities))
}

fn optimize<E: Display>(graph: Result<ModularityGraph, E>, config: &Config) -> Partition {
    let mut graph = match graph {
        Ok(graph) => graph,
        Err(err) => {
            log::error!("Rejected graph input: {}", err);
            return Partition::invalid();
        }
    };
    match detect_communities(&mut graph, config) {
        Ok(_) => Partition::from_graph(&graph),
        Err(err) => {
            log::error!("Error: {}", err);
            Partition::invalid()
        }
    }
}

/// Partition a graph given as weighted edges over `size` vertices
pub fn execute(size: usize, edges: &[Edge], config: &Config) -> Partition {
    optimize(
        ModularityGraph::from_edges(
            size,
            edges,
            config.directed,
            config.modularity_resolution,
            config.treat_as_modularity,
        ),
        config,
    )
}

/// Modularity of a caller-supplied labeling of an edge-list graph
///
/// Labels only need to be equal within a community, they are not renumbered.
pub fn modularity_of(
    size: usize,
    edges: &[Edge],
    labels: &[usize],
    config: &Config,
) -> Result<f64, GraphError> {
    let mut graph = ModularityGraph::from_edges(
        size,
        edges,
        config.directed,
        config.modularity_resolution,
        config.treat_as_modularity,
    )?;
    graph.set_communities(labels.to_vec(), None)?;
    Ok(graph.modularity())
}

/// Partition a graph given as a dense matrix
pub fn execute_from_matrix(rows: &[Vec<f64>], config: &Config) -> Partition {
    optimize(
        ModularityGraph::from_rows(
            rows,
            config.directed,
            config.modularity_resolution,
            config.treat_as_modularity,
        ),
        config,
    )
}

/// Partition a graph read from an `.edgelist`, `.net`, `.csv` or `.parquet` file
pub fn execute_from_file<P: AsRef<Path>>(path: P, config: &Config) -> Partition {
    optimize(
        crate::data::read_graph_from_file(
            path.as_ref(),
            config.modularity_resolution,
            config.treat_as_modularity,
        ),
        config,
    )
}

/// Partition a petgraph graph, node indices become vertex ids
pub fn execute_from_petgraph<N, E, Ty, Ix, F>(
    graph: &Graph<N, E, Ty, Ix>,
    weight: F,
    config: &Config,
) -> Partition
where
    Ty: EdgeType,
    Ix: IndexType,
    F: Fn(&E) -> f64,
{
    optimize(
        from_petgraph(
            graph,
            weight,
            config.modularity_resolution,
            config.treat_as_modularity,
        ),
        config,
    )
}
