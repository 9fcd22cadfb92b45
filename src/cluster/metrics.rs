//! Per-community statistics of a partitioned graph

use crate::cluster::Community;
use crate::graph::ModularityGraph;
use itertools::Itertools;
use rayon::prelude::*;

/// Graphs below this size are summarized sequentially
const PARALLEL_THRESHOLD: usize = 1000;

/// Sum of modularity entries over all pairs of `members`
pub fn modularity_contribution(graph: &ModularityGraph, members: &[usize]) -> f64 {
    let matrix = graph.modularity_matrix();
    members
        .iter()
        .map(|&i| members.iter().map(|&j| matrix[[i, j]]).sum::<f64>())
        .sum()
}

fn summarize(graph: &ModularityGraph, id: usize, members: Vec<usize>) -> Community {
    let modularity_contribution = modularity_contribution(graph, &members);
    Community {
        id,
        size: members.len(),
        members,
        modularity_contribution,
    }
}

/// Summaries of every community, ordered by id
///
/// The contributions add up to the graph's modularity.
pub fn community_summaries(graph: &ModularityGraph) -> Vec<Community> {
    let groups: Vec<(usize, Vec<usize>)> = graph
        .communities()
        .iter()
        .enumerate()
        .map(|(vertex, &label)| (label, vertex))
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(label, _)| *label)
        .collect();

    // Large graphs have expensive O(n^2) contributions, spread them out
    if graph.size() < PARALLEL_THRESHOLD {
        groups
            .into_iter()
            .map(|(id, members)| summarize(graph, id, members))
            .collect()
    } else {
        groups
            .into_par_iter()
            .map(|(id, members)| summarize(graph, id, members))
            .collect()
    }
}

/// Community sizes indexed by label
pub fn community_sizes(communities: &[usize]) -> Vec<usize> {
    let count = communities.iter().max().map_or(0, |&max| max + 1);
    let mut sizes = vec![0; count];
    for &label in communities {
        sizes[label] += 1;
    }
    sizes
}
