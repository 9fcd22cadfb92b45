//! Results persistence module

use anyhow::{Context, Result};
use crate::cluster::detection::RunSummary;
use crate::cluster::metrics::community_summaries;
use crate::cluster::Community;
use crate::config::Config;
use crate::graph::ModularityGraph;
use serde_json::{json, to_string_pretty};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Save the partition held by `graph` to `output_dir`
pub fn save_results(
    graph: &ModularityGraph,
    run: &RunSummary,
    config: &Config,
    output_dir: &Path,
) -> Result<()> {
    log::info!(
        "Saving {} communities to {}",
        graph.number_of_communities(),
        output_dir.display()
    );

    // Ensure output directory exists
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Cannot create {}", output_dir.display()))?;

    let communities = community_summaries(graph);

    save_labels(graph.communities(), &output_dir.join("communities.txt"))?;
    save_summary(graph, &communities, run, config, output_dir)?;
    save_communities(&communities, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// One community label per line, in vertex order
pub fn save_labels(labels: &[usize], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("File {} can not be opened", path.display()))?;
    let mut writer = BufWriter::new(file);
    for label in labels {
        writeln!(writer, "{}", label)?;
    }
    writer.flush()?;
    Ok(())
}

/// Save summary information
fn save_summary(
    graph: &ModularityGraph,
    communities: &[Community],
    run: &RunSummary,
    config: &Config,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving summary information");

    let path = output_dir.join("summary.json");
    let mut file = File::create(path)?;

    let summary = json!({
        "graph_stats": {
            "vertex_count": graph.size(),
            "directed": graph.is_directed(),
            "modularity_resolution": graph.modularity_resolution(),
        },
        "community_stats": {
            "modularity": graph.modularity(),
            "community_count": communities.len(),
            "sizes": communities.iter().map(|c| c.size).collect::<Vec<_>>(),
            "largest_community_size": communities.iter().map(|c| c.size).max().unwrap_or(0),
            "smallest_community_size": communities.iter().map(|c| c.size).min().unwrap_or(0),
        },
        "run": {
            "seed": run.seed,
            "moves_applied": run.applied_moves.len(),
            "verification_failures": run.verification_failures,
        },
        "config": config,
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Save individual community information
fn save_communities(communities: &[Community], output_dir: &Path) -> Result<()> {
    log::info!("Saving individual community information");

    let path = output_dir.join("communities.json");
    let mut file = File::create(path)?;
    let communities_json = json!({ "communities": communities });
    file.write_all(to_string_pretty(&communities_json)?.as_bytes())?;

    Ok(())
}
