use approx::assert_abs_diff_eq;
use combo_communities::cluster::metrics::community_sizes;
use combo_communities::graph::matrix::is_symmetric;
use combo_communities::{
    detect_communities, execute, execute_from_file, execute_from_matrix, execute_from_petgraph,
    ComboAlgorithm, Config, Edge, ModularityGraph, INVALID_MODULARITY, THRESHOLD,
};
use petgraph::graph::{DiGraph, UnGraph};
use proptest::prelude::*;

fn two_triangles() -> Vec<Edge> {
    vec![
        (0, 1, 1.0),
        (1, 2, 1.0),
        (0, 2, 1.0),
        (3, 4, 1.0),
        (4, 5, 1.0),
        (3, 5, 1.0),
    ]
}

/// Two 4-cliques joined by the single edge 3-4
fn bridged_cliques() -> Vec<Edge> {
    let mut edges = Vec::new();
    for offset in [0, 4] {
        for i in 0..4 {
            for j in (i + 1)..4 {
                edges.push((offset + i, offset + j, 1.0));
            }
        }
    }
    edges.push((3, 4, 1.0));
    edges
}

/// Zachary's karate club, 34 members and 78 ties
fn karate_club() -> Vec<Edge> {
    let adjacency: [(usize, &[usize]); 26] = [
        (1, &[2, 3, 4, 5, 6, 7, 8, 9, 11, 12, 13, 14, 18, 20, 22, 32]),
        (2, &[3, 4, 8, 14, 18, 20, 22, 31]),
        (3, &[4, 8, 9, 10, 14, 28, 29, 33]),
        (4, &[8, 13, 14]),
        (5, &[7, 11]),
        (6, &[7, 11, 17]),
        (7, &[17]),
        (9, &[31, 33, 34]),
        (10, &[34]),
        (14, &[34]),
        (15, &[33, 34]),
        (16, &[33, 34]),
        (19, &[33, 34]),
        (20, &[34]),
        (21, &[33, 34]),
        (23, &[33, 34]),
        (24, &[26, 28, 30, 33, 34]),
        (25, &[26, 28, 32]),
        (26, &[32]),
        (27, &[30, 34]),
        (28, &[34]),
        (29, &[32, 34]),
        (30, &[33, 34]),
        (31, &[33, 34]),
        (32, &[33, 34]),
        (33, &[34]),
    ];
    adjacency
        .iter()
        .flat_map(|&(source, targets)| targets.iter().map(move |&t| (source - 1, t - 1, 1.0)))
        .collect()
}

fn assert_same_community(labels: &[usize], members: &[usize]) {
    for pair in members.windows(2) {
        assert_eq!(labels[pair[0]], labels[pair[1]], "labels {:?}", labels);
    }
}

#[test]
fn two_triangles_split_into_two_communities() {
    let partition = execute(6, &two_triangles(), &Config::default().with_seed(7));

    assert_eq!(partition.number_of_communities(), 2);
    assert_same_community(&partition.communities, &[0, 1, 2]);
    assert_same_community(&partition.communities, &[3, 4, 5]);
    assert_ne!(partition.communities[0], partition.communities[3]);
    assert!(partition.modularity > 0.0);
    // two equal disjoint halves: 2 * (1/2 - 1/4)
    assert_abs_diff_eq!(partition.modularity, 0.5, epsilon = 1e-9);
}

#[test]
fn single_vertex_without_edges() {
    let partition = execute(1, &[], &Config::default().with_seed(1));
    assert_eq!(partition.communities, vec![0]);
    assert_eq!(partition.modularity, 0.0);
}

#[test]
fn zero_weights_keep_one_community() {
    let edges = [(0, 1, 0.0), (1, 2, 0.0)];
    let partition = execute(3, &edges, &Config::default().with_seed(1));
    assert_eq!(partition.communities, vec![0, 0, 0]);
    assert_eq!(partition.modularity, 0.0);
}

#[test]
fn community_cap_of_one_stops_immediately() {
    let edges = bridged_cliques();
    let config = Config::default().with_seed(3).with_max_communities(1);
    let mut graph = ModularityGraph::from_edges(8, &edges, false, 1.0, false).unwrap();
    let run = detect_communities(&mut graph, &config).unwrap();

    assert!(run.applied_moves.is_empty());
    assert_eq!(graph.communities(), &[0; 8]);
    assert_abs_diff_eq!(
        graph.modularity(),
        graph.modularity_matrix().sum(),
        epsilon = 1e-12
    );
}

#[test]
fn karate_club_reaches_known_optimum() {
    let edges = karate_club();
    assert_eq!(edges.len(), 78);
    let partition = execute(34, &edges, &Config::default().with_seed(1));
    assert_eq!(partition.number_of_communities(), 4);
    assert_abs_diff_eq!(partition.modularity, 0.419790, epsilon = 1e-5);
}

#[test]
fn community_cap_bounds_growth_and_keeps_bookkeeping_exact() {
    let edges = karate_club();
    let mut single = ModularityGraph::from_edges(34, &edges, false, 1.0, false).unwrap();
    single.assign_single_community();
    let single_modularity = single.modularity();

    for cap in [2, 3, 4] {
        for seed in 0..4 {
            let mut graph = ModularityGraph::from_edges(34, &edges, false, 1.0, false).unwrap();
            let run = ComboAlgorithm::new(Some(seed), 0, (seed % 2) as usize)
                .with_debug_verify(true)
                .run(&mut graph, Some(cap));

            assert!(graph.number_of_communities() <= cap, "cap {} seed {}", cap, seed);
            assert!(graph.has_dense_labels());
            assert_eq!(run.verification_failures, 0, "cap {} seed {}", cap, seed);
            assert!(run.applied_moves.iter().all(|m| m.destination < cap));
            assert!(graph.modularity() > single_modularity + THRESHOLD);
            if cap < 4 {
                // the unbounded optimum has four communities, every slot gets used
                assert_eq!(graph.number_of_communities(), cap);
            }
        }
    }
}

#[test]
fn higher_resolution_does_not_merge_communities() {
    let edges = bridged_cliques();
    let classic = execute(8, &edges, &Config::default().with_seed(11));
    let fine = execute(8, &edges, &Config::default().with_seed(11).with_resolution(2.0));

    assert_eq!(classic.number_of_communities(), 2);
    assert_same_community(&classic.communities, &[0, 1, 2, 3]);
    assert_same_community(&classic.communities, &[4, 5, 6, 7]);
    assert!(fine.number_of_communities() >= classic.number_of_communities());
}

#[test]
fn same_seed_same_partition() {
    let edges = bridged_cliques();
    let config = Config::default().with_seed(2024).with_fixed_split_step(2);
    let first = execute(8, &edges, &config);
    let second = execute(8, &edges, &config);
    assert_eq!(first, second);
}

#[test]
fn applied_moves_increase_modularity() {
    let edges = bridged_cliques();
    let mut graph = ModularityGraph::from_edges(8, &edges, false, 1.0, false).unwrap();
    graph.assign_single_community();
    let start = graph.modularity();
    let run = ComboAlgorithm::new(Some(5), 0, 0)
        .with_debug_verify(true)
        .run(&mut graph, None);

    assert_eq!(run.seed, 5);
    assert_eq!(run.verification_failures, 0);
    assert!(!run.applied_moves.is_empty());

    let mut previous = start;
    for applied in &run.applied_moves {
        assert!(applied.gain > THRESHOLD);
        let after = applied.modularity_after.unwrap();
        assert!(after > previous);
        previous = after;
    }
    assert_abs_diff_eq!(previous, graph.modularity(), epsilon = 1e-12);
}

#[test]
fn invalid_input_yields_empty_result() {
    let config = Config::default().with_seed(1);

    let out_of_range = execute(3, &[(0, 5, 1.0)], &config);
    assert!(out_of_range.communities.is_empty());
    assert_eq!(out_of_range.modularity, INVALID_MODULARITY);

    assert!(!execute(0, &[], &config).is_valid());

    let ragged = vec![vec![0.0, 1.0], vec![1.0]];
    assert_eq!(execute_from_matrix(&ragged, &config).modularity, INVALID_MODULARITY);

    let missing = execute_from_file("/nonexistent/graph.edgelist", &config);
    assert!(!missing.is_valid());

    let unsupported = execute_from_file("graph.gml", &config);
    assert_eq!(unsupported.modularity, INVALID_MODULARITY);

    let dir = tempfile::tempdir().unwrap();
    let extreme = dir.path().join("extreme.edgelist");
    std::fs::write(&extreme, "-9223372036854775808 9223372036854775807 1\n").unwrap();
    let extreme = execute_from_file(&extreme, &config);
    assert!(extreme.communities.is_empty());
    assert_eq!(extreme.modularity, INVALID_MODULARITY);
}

#[test]
fn matrix_input_matches_edge_input() {
    let mut rows = vec![vec![0.0; 6]; 6];
    for (i, j, w) in two_triangles() {
        rows[i][j] = w;
        rows[j][i] = w;
    }
    let config = Config::default().with_seed(19);
    let from_matrix = execute_from_matrix(&rows, &config);
    let from_edges = execute(6, &two_triangles(), &config);

    assert_eq!(from_matrix.number_of_communities(), 2);
    assert_abs_diff_eq!(from_matrix.modularity, from_edges.modularity, epsilon = 1e-9);
}

#[test]
fn petgraph_input() {
    let undirected = UnGraph::<(), f64>::from_edges(
        two_triangles()
            .into_iter()
            .map(|(i, j, w)| (i as u32, j as u32, w)),
    );
    let partition = execute_from_petgraph(&undirected, |w: &f64| *w, &Config::default().with_seed(4));
    assert_eq!(partition.number_of_communities(), 2);
    assert_same_community(&partition.communities, &[0, 1, 2]);

    let directed = DiGraph::<(), f64>::from_edges([(0u32, 1u32, 1.0), (1, 2, 1.0), (2, 0, 1.0)]);
    let partition = execute_from_petgraph(&directed, |w: &f64| *w, &Config::default().with_seed(4));
    assert_eq!(partition.communities.len(), 3);
}

#[test]
fn edgelist_file_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triangles.edgelist");
    let contents: String = two_triangles()
        .iter()
        .map(|(i, j, w)| format!("{} {} {}\n{} {} {}\n", i + 1, j + 1, w, j + 1, i + 1, w))
        .collect();
    std::fs::write(&path, contents).unwrap();

    let partition = execute_from_file(&path, &Config::default().with_seed(8));
    assert_eq!(partition.number_of_communities(), 2);
    assert_same_community(&partition.communities, &[0, 1, 2]);
}

fn small_graph() -> impl Strategy<Value = (usize, Vec<Edge>, bool)> {
    (2usize..10).prop_flat_map(|size| {
        (
            Just(size),
            prop::collection::vec((0..size, 0..size, 0.1f64..5.0), 0..25),
            any::<bool>(),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn modularity_matrix_is_symmetric((size, edges, directed) in small_graph()) {
        let graph = ModularityGraph::from_edges(size, &edges, directed, 1.0, false).unwrap();
        prop_assert!(is_symmetric(&graph.modularity_matrix()));
    }

    #[test]
    fn labels_are_dense_and_modularity_never_drops(
        (size, edges, directed) in small_graph(),
        seed in any::<u64>(),
    ) {
        let config = Config::default().with_directed(directed).with_seed(seed);
        let partition = execute(size, &edges, &config);
        prop_assert_eq!(partition.communities.len(), size);
        prop_assert!(community_sizes(&partition.communities).iter().all(|&s| s > 0));

        // a single community is always reachable and the engine only improves on it
        let mut single = ModularityGraph::from_edges(size, &edges, directed, 1.0, false).unwrap();
        single.assign_single_community();
        prop_assert!(partition.modularity >= single.modularity() - 1e-9);
    }
}
