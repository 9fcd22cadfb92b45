//! Combo community detection: best-move search over community pairs

use crate::cluster::bisection::{self, SplitSettings};
use crate::cluster::moves::MoveTable;
use crate::config::{Config, SplitAttempts};
use crate::graph::ModularityGraph;
use crate::THRESHOLD;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A move applied during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedMove {
    /// Community the vertices left
    pub origin: usize,

    /// Community they joined, before any renumbering
    pub destination: usize,

    /// Modularity gain predicted for the move
    pub gain: f64,

    /// Whether the move opened a new community
    pub created_community: bool,

    /// Modularity recomputed after the move, only tracked when verifying
    pub modularity_after: Option<f64>,
}

/// What happened during one call to [`ComboAlgorithm::run`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Seed the engine's generator started from
    pub seed: u64,

    /// Moves in the order they were applied
    pub applied_moves: Vec<AppliedMove>,

    /// Bookkeeping mismatches found when verification is enabled
    pub verification_failures: usize,
}

/// Modularity optimizer alternating candidate splits and best-move application
pub struct ComboAlgorithm {
    split_attempts: SplitAttempts,
    fixed_split_step: usize,
    debug_verify: bool,
    seed: u64,
    rng: StdRng,

    /// Best gain of the latest sweep, drives the auto-tuned restart count
    current_best_gain: f64,

    verification_failures: usize,
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Destination slots to consider: every community plus one empty slot below the cap
fn open_slots(graph: &ModularityGraph, max_communities: usize) -> usize {
    let count = graph.number_of_communities();
    count + usize::from(count < max_communities)
}

impl ComboAlgorithm {
    /// Create an engine, seeding from the clock when `random_seed` is `None`
    pub fn new(random_seed: Option<u64>, num_split_attempts: i32, fixed_split_step: usize) -> Self {
        let config = Config {
            random_seed,
            num_split_attempts,
            fixed_split_step,
            ..Config::default()
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Self {
        let seed = config.random_seed.unwrap_or_else(clock_seed);
        Self {
            split_attempts: config.split_attempts(),
            fixed_split_step: config.fixed_split_step,
            debug_verify: config.debug_verify,
            seed,
            rng: StdRng::seed_from_u64(seed),
            current_best_gain: 1.0,
            verification_failures: 0,
        }
    }

    pub fn with_debug_verify(mut self, debug_verify: bool) -> Self {
        self.debug_verify = debug_verify;
        self
    }

    /// Seed the generator was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn split_settings(&self) -> SplitSettings {
        let tries = match self.split_attempts {
            SplitAttempts::Fixed(tries) => tries,
            SplitAttempts::Auto(tune) => tune.tries(self.current_best_gain),
        };
        SplitSettings {
            tries,
            fixed_split_step: self.fixed_split_step,
            debug_verify: self.debug_verify,
        }
    }

    /// Recompute the candidate of moving part of `origin` into `destination`
    fn recalc(
        &mut self,
        graph: &ModularityGraph,
        table: &mut MoveTable,
        origin: usize,
        destination: usize,
    ) {
        table.set_gain(origin, destination, 0.0);
        if origin == destination {
            return;
        }
        let origin_vertices = graph.community_indices(origin);
        if origin_vertices.is_empty() {
            return;
        }
        let destination_vertices = graph.community_indices(destination);
        let correction = graph.correction_vector(&origin_vertices, &destination_vertices);
        let submatrix = graph.modularity_submatrix(&origin_vertices);

        let settings = self.split_settings();
        let outcome = bisection::split(submatrix, &correction, &settings, &mut self.rng);
        self.verification_failures += outcome.verification_failures;

        table.set_gain(origin, destination, outcome.gain);
        table.record_split(destination, &origin_vertices, &outcome.to_be_moved);
    }

    /// Recompute every origin's candidate toward the empty slot after the last community
    ///
    /// Used when a deletion frees a slot at the cap; the slot has no
    /// candidates of its own yet.
    fn refill_open_slot(&mut self, graph: &ModularityGraph, table: &mut MoveTable) {
        let slot = graph.number_of_communities();
        for origin in 0..slot {
            self.recalc(graph, table, origin, slot);
        }
    }

    /// Partition `graph` starting from a single community
    ///
    /// Stops when no candidate move gains more than the threshold. At most
    /// `max_communities` communities are created (`None` or 0 for no limit
    /// beyond the graph size).
    pub fn run(&mut self, graph: &mut ModularityGraph, max_communities: Option<usize>) -> RunSummary {
        let size = graph.size();
        self.verification_failures = 0;
        let mut summary = RunSummary {
            seed: self.seed,
            ..RunSummary::default()
        };
        if size == 0 {
            log::warn!("Graph is empty, nothing to partition");
            return summary;
        }

        let max_communities = match max_communities {
            Some(limit) if limit > 0 => limit.min(size),
            _ => size,
        };
        log::info!(
            "Running combo on {} vertices (max {} communities, seed {})",
            size,
            max_communities,
            self.seed
        );

        graph.assign_single_community();
        let mut current_modularity = graph.modularity();
        let mut table = MoveTable::new(2, size);
        self.current_best_gain = 1.0;

        for origin in 0..graph.number_of_communities() {
            for destination in 0..open_slots(graph, max_communities) {
                self.recalc(graph, &mut table, origin, destination);
            }
        }
        let (mut best_gain, mut origin, mut destination) =
            table.best(graph.number_of_communities(), open_slots(graph, max_communities));
        self.current_best_gain = best_gain;

        while best_gain > THRESHOLD {
            let created_community = destination >= graph.number_of_communities();
            graph.perform_split(origin, destination, table.split(destination));

            let count = graph.number_of_communities();
            if created_community && destination + 1 < max_communities {
                if destination + 1 >= table.len() {
                    table.add_slot();
                }
                table.copy_slot(destination, destination + 1, destination);
            }

            for i in 0..open_slots(graph, max_communities) {
                self.recalc(graph, &mut table, origin, i);
                self.recalc(graph, &mut table, destination, i);
                if i != destination && i < count {
                    self.recalc(graph, &mut table, i, origin);
                }
                if i != origin && i < count {
                    self.recalc(graph, &mut table, i, destination);
                }
            }

            let was_at_cap = count >= max_communities;
            if graph.delete_community_if_empty(origin) {
                table.remove_slot(origin);
                log::debug!("Community {} emptied and removed", origin);
                if was_at_cap {
                    self.refill_open_slot(graph, &mut table);
                }
            }

            let mut applied = AppliedMove {
                origin,
                destination,
                gain: best_gain,
                created_community,
                modularity_after: None,
            };
            if self.debug_verify {
                let modularity = graph.modularity();
                if (modularity - current_modularity - best_gain).abs() > THRESHOLD {
                    log::warn!(
                        "Modularity moved by {:.9} but the move predicted {:.9}",
                        modularity - current_modularity,
                        best_gain
                    );
                    self.verification_failures += 1;
                }
                if !graph.has_dense_labels() {
                    log::warn!("Community labels are not contiguous after a move");
                    self.verification_failures += 1;
                }
                current_modularity = modularity;
                applied.modularity_after = Some(modularity);
            }
            log::debug!(
                "Moved part of community {} into {} (gain {:.6}, {} communities)",
                origin,
                destination,
                best_gain,
                graph.number_of_communities()
            );
            summary.applied_moves.push(applied);

            (best_gain, origin, destination) =
                table.best(graph.number_of_communities(), open_slots(graph, max_communities));
            self.current_best_gain = best_gain;
        }

        summary.verification_failures = self.verification_failures;
        log::info!(
            "Combo finished after {} moves with {} communities",
            summary.applied_moves.len(),
            graph.number_of_communities()
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ModularityGraph;

    fn two_triangles() -> ModularityGraph {
        let edges = [
            (0, 1, 1.0),
            (1, 2, 1.0),
            (0, 2, 1.0),
            (3, 4, 1.0),
            (4, 5, 1.0),
            (3, 5, 1.0),
        ];
        ModularityGraph::from_edges(6, &edges, false, 1.0, false).unwrap()
    }

    #[test]
    fn test_run_finds_triangles() {
        let mut graph = two_triangles();
        let summary = ComboAlgorithm::new(Some(42), 0, 0)
            .with_debug_verify(true)
            .run(&mut graph, None);
        let labels = graph.communities();
        assert_eq!(graph.number_of_communities(), 2);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(summary.verification_failures, 0);
        assert!(summary.applied_moves.iter().all(|m| m.gain > THRESHOLD));
    }

    #[test]
    fn test_refill_open_slot_recomputes_stale_candidates() {
        let mut graph = two_triangles();
        graph.assign_single_community();
        let mut table = MoveTable::new(2, graph.size());
        table.set_gain(0, 1, -0.75);

        let mut combo = ComboAlgorithm::new(Some(17), 4, 0);
        combo.refill_open_slot(&graph, &mut table);

        // best split of the lone community peels off one triangle
        assert!(table.gain(0, 1) > THRESHOLD);
        let moved = table.split(1);
        assert_eq!(moved[0], moved[1]);
        assert_eq!(moved[1], moved[2]);
        assert_eq!(moved[3], moved[4]);
        assert_eq!(moved[4], moved[5]);
        assert_ne!(moved[0], moved[3]);
    }

    #[test]
    fn test_cap_of_one_keeps_single_community() {
        let mut graph = two_triangles();
        let summary = ComboAlgorithm::new(Some(3), 0, 0).run(&mut graph, Some(1));
        assert!(summary.applied_moves.is_empty());
        assert_eq!(graph.communities(), &[0; 6]);
    }

    #[test]
    fn test_fixed_splits_and_fixed_tries() {
        let mut graph = two_triangles();
        let summary = ComboAlgorithm::new(Some(11), 6, 1)
            .with_debug_verify(true)
            .run(&mut graph, None);
        assert_eq!(graph.number_of_communities(), 2);
        assert_eq!(summary.verification_failures, 0);
    }

    #[test]
    fn test_empty_graph_is_a_no_op() {
        let mut graph = ModularityGraph::empty();
        let summary = ComboAlgorithm::new(Some(1), 0, 0).run(&mut graph, None);
        assert!(summary.applied_moves.is_empty());
        assert!(graph.communities().is_empty());
    }

    #[test]
    fn test_same_seed_same_run() {
        let edges: Vec<_> = (0..12)
            .flat_map(|i| [(i, (i + 1) % 12, 1.0), (i, (i + 3) % 12, 0.5)])
            .collect();
        let run = |seed| {
            let mut graph = ModularityGraph::from_edges(12, &edges, false, 1.0, false).unwrap();
            let summary = ComboAlgorithm::new(Some(seed), 0, 0).run(&mut graph, None);
            (graph.communities().to_vec(), graph.modularity(), summary.applied_moves.len())
        };
        assert_eq!(run(5), run(5));
    }
}
