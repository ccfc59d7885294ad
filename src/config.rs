use crate::error::{KMeansError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the starting centroids are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InitStrategy {
    /// Give every point a uniformly random label, then average.
    #[default]
    RandomLabels,
    /// Copy K pairwise-distinct points as the initial centroids.
    DistinctSample,
}

/// What happens to a centroid that ends an iteration with no points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyClusterPolicy {
    /// Leave it at the zero vector until some later pass assigns points to it.
    #[default]
    Keep,
    /// Move it onto a randomly drawn point.
    Reseed,
}

/// Whether the per-point loop runs on the rayon pool or on the calling thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    #[default]
    Parallel,
    Sequential,
}

/// Configuration for a k-means run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    /// Number of clusters (K).
    pub num_clusters: usize,

    /// Iteration cap; 0 means run until convergence.
    pub max_iterations: usize,

    /// Seed for every random choice made during seeding and reseeding.
    pub seed: u64,

    pub init: InitStrategy,

    pub empty_clusters: EmptyClusterPolicy,

    pub execution: ExecutionMode,

    /// Worker count for a dedicated pool. `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            num_clusters: 8,
            max_iterations: 0,
            seed: 1,
            init: InitStrategy::RandomLabels,
            empty_clusters: EmptyClusterPolicy::Keep,
            execution: ExecutionMode::Parallel,
            threads: None,
        }
    }
}

impl KMeansConfig {
    pub fn new(num_clusters: usize) -> Self {
        Self {
            num_clusters,
            ..Self::default()
        }
    }

    /// Load a config from a YAML file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: KMeansConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_init(mut self, init: InitStrategy) -> Self {
        self.init = init;
        self
    }

    pub fn with_empty_clusters(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_clusters = policy;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_clusters == 0 {
            return Err(KMeansError::InvalidConfig(
                "number of clusters must be larger than 0".into(),
            ));
        }
        if self.threads == Some(0) {
            return Err(KMeansError::InvalidConfig(
                "thread count must be larger than 0".into(),
            ));
        }
        Ok(())
    }
}
