//! Graph file readers

pub mod csv;
pub mod parquet;
pub mod text;

use anyhow::{bail, Result};
use crate::graph::ModularityGraph;
use std::path::Path;

/// Read a graph, choosing the format from the file extension
///
/// Supported: `.edgelist` (directed edge list), `.net` (Pajek), `.csv`
/// (dense weight matrix) and `.parquet` (edge table).
pub fn read_graph_from_file(
    path: &Path,
    modularity_resolution: f64,
    treat_as_modularity: bool,
) -> Result<ModularityGraph> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    log::info!("Reading {} graph from {}", extension, path.display());

    let graph = match extension {
        "edgelist" => text::read_edgelist(path, modularity_resolution, treat_as_modularity)?,
        "net" => text::read_pajek(path, modularity_resolution, treat_as_modularity)?,
        "csv" => csv::read_matrix_csv(path, modularity_resolution, treat_as_modularity)?,
        "parquet" => parquet::read_edge_table(path, modularity_resolution, treat_as_modularity)?,
        _ => bail!(
            "unsupported file format for {}: must be Pajek .net, .edgelist, .csv or .parquet",
            path.display()
        ),
    };

    log::info!(
        "Loaded graph with {} vertices ({})",
        graph.size(),
        if graph.is_directed() { "directed" } else { "undirected" }
    );
    Ok(graph)
}
