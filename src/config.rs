//! Configuration management for the community detection engine

use serde::{Deserialize, Serialize};

/// Run configuration shared by the host entry points, the CLI and the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Treat edge input as directed
    pub directed: bool,

    /// Weight of the null-model term (1.0 is classic Newman modularity)
    pub modularity_resolution: f64,

    /// Upper bound on the number of communities, `None` or 0 for unbounded
    pub max_communities: Option<usize>,

    /// 0 auto-tunes the restart count, >0 fixes it, -1/-2 pick alternate auto-tune constants
    pub num_split_attempts: i32,

    /// 0 uses only random restarts, >0 interleaves the six fixed seed splits
    pub fixed_split_step: usize,

    /// Interpret the input as a modularity matrix instead of edge weights
    pub treat_as_modularity: bool,

    /// Seed for the engine's generator, `None` seeds from the clock
    pub random_seed: Option<u64>,

    /// Cross-check incremental bookkeeping against full recomputation
    pub debug_verify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directed: false,
            modularity_resolution: 1.0,
            max_communities: None,
            num_split_attempts: 0,
            fixed_split_step: 0,
            treat_as_modularity: false,
            random_seed: None,
            debug_verify: false,
        }
    }
}

impl Config {
    /// Create a new configuration with custom engine values
    pub fn new(
        modularity_resolution: f64,
        max_communities: Option<usize>,
        num_split_attempts: i32,
        fixed_split_step: usize,
        random_seed: Option<u64>,
    ) -> Self {
        Self {
            modularity_resolution,
            max_communities,
            num_split_attempts,
            fixed_split_step,
            random_seed,
            ..Self::default()
        }
    }

    pub fn with_directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.modularity_resolution = resolution;
        self
    }

    pub fn with_max_communities(mut self, max_communities: usize) -> Self {
        self.max_communities = Some(max_communities);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_split_attempts(mut self, attempts: i32) -> Self {
        self.num_split_attempts = attempts;
        self
    }

    pub fn with_fixed_split_step(mut self, step: usize) -> Self {
        self.fixed_split_step = step;
        self
    }

    pub fn with_treat_as_modularity(mut self, treat_as_modularity: bool) -> Self {
        self.treat_as_modularity = treat_as_modularity;
        self
    }

    pub fn with_debug_verify(mut self, debug_verify: bool) -> Self {
        self.debug_verify = debug_verify;
        self
    }

    /// Typed view of `num_split_attempts`
    pub fn split_attempts(&self) -> SplitAttempts {
        match self.num_split_attempts {
            n if n > 0 => SplitAttempts::Fixed(n as usize),
            -1 => SplitAttempts::Auto(AutoTune {
                c1: 1.5 * std::f64::consts::LN_10,
                c2: 1.0,
            }),
            -2 => SplitAttempts::Auto(AutoTune {
                c1: std::f64::consts::LN_10,
                c2: 1.0,
            }),
            _ => SplitAttempts::Auto(AutoTune::default()),
        }
    }
}

/// How many randomized restarts the bisection runs per candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitAttempts {
    Fixed(usize),
    Auto(AutoTune),
}

/// Constants of the restart budget `floor(|ln g|^c2 / c1) + 3`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoTune {
    pub c1: f64,
    pub c2: f64,
}

impl Default for AutoTune {
    fn default() -> Self {
        Self { c1: 2.0, c2: 1.5 }
    }
}

impl AutoTune {
    /// Restart count given the best gain of the previous sweep
    pub fn tries(&self, last_best_gain: f64) -> usize {
        // gains at or below the threshold never trigger another sweep
        let gain = last_best_gain.max(crate::THRESHOLD);
        (gain.ln().abs().powf(self.c2) / self.c1) as usize + 3
    }
}
