use anyhow::{bail, Result};
use clap::Parser;
use combo_communities::{cluster, data, storage, Config};
use std::path::Path;

#[derive(Parser, Debug)]
#[clap(
    name = "combo",
    about = "Modularity-maximizing community detection with the Combo algorithm"
)]
struct Cli {
    /// Path to input graph (.edgelist, .net, .csv or .parquet)
    input: String,

    /// Output directory for results
    #[clap(long, default_value = "combo_results")]
    output_dir: String,

    /// Maximum number of communities (0 = unbounded)
    #[clap(long, default_value = "0")]
    max_communities: usize,

    /// Modularity resolution parameter
    #[clap(long, default_value = "1.0")]
    resolution: f64,

    /// Split restarts (0 = auto-tune, -1/-2 = alternate auto-tune curves)
    #[clap(long, default_value = "0", allow_negative_numbers = true)]
    split_attempts: i32,

    /// Interleave a fixed seed split every N restarts (0 = random only)
    #[clap(long, default_value = "0")]
    fixed_split_step: usize,

    /// Read the input as a modularity matrix instead of edge weights
    #[clap(long)]
    treat_as_modularity: bool,

    /// Random seed (defaults to the clock)
    #[clap(long)]
    seed: Option<u64>,

    /// Cross-check every applied move against a full recomputation
    #[clap(long)]
    debug_verify: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let mut config = Config::new(
        args.resolution,
        Some(args.max_communities),
        args.split_attempts,
        args.fixed_split_step,
        args.seed,
    )
    .with_treat_as_modularity(args.treat_as_modularity)
    .with_debug_verify(args.debug_verify);

    log::info!("Starting community detection");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);

    // 1. Load data
    let mut graph = data::read_graph_from_file(
        Path::new(&args.input),
        config.modularity_resolution,
        config.treat_as_modularity,
    )?;
    if graph.is_empty() {
        bail!("Graph in {} has no vertices", args.input);
    }
    config.directed = graph.is_directed();

    log::info!(
        "Loaded {} graph with {} vertices",
        if graph.is_directed() { "directed" } else { "undirected" },
        graph.size()
    );

    // 2. Find communities
    let run = cluster::detect_communities(&mut graph, &config)?;

    log::info!(
        "Found {} communities with modularity {:.6} after {} moves",
        graph.number_of_communities(),
        graph.modularity(),
        run.applied_moves.len()
    );
    if run.verification_failures > 0 {
        log::warn!("{} bookkeeping mismatches detected", run.verification_failures);
    }

    // 3. Save results
    storage::save_results(&graph, &run, &config, Path::new(&args.output_dir))?;

    println!("{:.6}", graph.modularity());
    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
