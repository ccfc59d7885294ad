//! Lloyd's k-means over dense or sparse points, parallelized with rayon.

mod driver;
mod seeding;

pub use driver::{cluster_once, nearest_centroid, IterationOutcome};
pub use seeding::{distinct_sample, random_labels, reseed_empty};

use crate::centroids::CentroidSet;
use crate::config::{EmptyClusterPolicy, InitStrategy, KMeansConfig};
use crate::error::{KMeansError, Result};
use crate::point::Point;
use crate::reducer::CentroidReducer;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Separates the reseeding stream from the seeding stream.
const RESEED_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// A full pass moved no point.
    Converged,
    /// The iteration cap was reached first.
    IterationLimit,
}

#[derive(Clone, Debug)]
pub struct KMeansResult {
    /// Final centroid means with the size of each cluster.
    pub centroids: CentroidSet,
    /// Cluster of each input point, in input order.
    pub labels: Vec<usize>,
    pub iterations: usize,
    pub termination: Termination,
    /// Within-cluster sum of squared errors of the final assignment.
    pub within_sse: f64,
    /// Clusters that ended with no points.
    pub empty_clusters: Vec<usize>,
}

impl KMeansResult {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    pub fn cluster_sizes(&self) -> &[usize] {
        self.centroids.counts()
    }
}

pub struct KMeans {
    config: KMeansConfig,
}

impl KMeans {
    pub fn new(config: KMeansConfig) -> Self {
        KMeans { config }
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Seed with the configured strategy and iterate until no point changes
    /// cluster or the iteration cap is hit. Labels are left on the points.
    pub fn fit<P: Point>(&self, points: &mut [P], dimensions: usize) -> Result<KMeansResult> {
        self.validate(points, dimensions)?;
        self.in_pool(|| {
            let start = Instant::now();
            let centroids = self.initial_centroids(points, dimensions)?;
            debug!(elapsed = ?start.elapsed(), init = ?self.config.init, "seeded centroids");
            self.converge(centroids, points)
        })
    }

    /// Iterate from caller-provided starting centroids.
    pub fn fit_from<P: Point>(
        &self,
        points: &mut [P],
        initial: CentroidSet,
    ) -> Result<KMeansResult> {
        if initial.num_clusters() != self.config.num_clusters {
            return Err(KMeansError::InvalidConfig(format!(
                "expected {} initial centroids, got {}",
                self.config.num_clusters,
                initial.num_clusters()
            )));
        }
        self.validate(points, initial.dimensions())?;
        self.in_pool(|| self.converge(initial, points))
    }

    fn validate<P: Point>(&self, points: &[P], dimensions: usize) -> Result<()> {
        self.config.validate()?;
        if dimensions == 0 {
            return Err(KMeansError::InvalidConfig(
                "number of dimensions must be larger than 0".into(),
            ));
        }
        if points.is_empty() {
            return Err(KMeansError::EmptyInput);
        }
        if let Some((index, point)) = points.iter().enumerate().find(|(_, p)| !p.fits(dimensions)) {
            return Err(KMeansError::DimensionMismatch {
                index,
                expected: dimensions,
                found: point.required_dimensions(),
            });
        }
        Ok(())
    }

    fn in_pool<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> Result<T> + Send,
    {
        match self.config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(op)
            }
            None => op(),
        }
    }

    fn initial_centroids<P: Point>(&self, points: &mut [P], dimensions: usize) -> Result<CentroidSet> {
        let k = self.config.num_clusters;
        let seed = self.config.seed;
        match self.config.init {
            InitStrategy::RandomLabels => {
                let reducer = CentroidReducer::new(k, dimensions, self.config.execution);
                Ok(random_labels(points, &reducer, seed))
            }
            InitStrategy::DistinctSample => distinct_sample(points, k, dimensions, seed),
        }
    }

    fn converge<P: Point>(&self, mut centroids: CentroidSet, points: &mut [P]) -> Result<KMeansResult> {
        let reducer = CentroidReducer::new(
            centroids.num_clusters(),
            centroids.dimensions(),
            self.config.execution,
        );
        let max_iterations = self.config.max_iterations;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed ^ RESEED_STREAM);

        info!(
            points = points.len(),
            k = centroids.num_clusters(),
            dimensions = centroids.dimensions(),
            sparse = P::NEEDS_CENTROID_NORMS,
            mode = ?reducer.mode(),
            "running k-means"
        );

        let mut iterations = 1;
        let termination = loop {
            let start = Instant::now();
            let outcome = cluster_once(&mut centroids, points, &reducer);
            debug!(
                iteration = iterations,
                changed = outcome.changed,
                elapsed = ?start.elapsed(),
                "assignment pass"
            );
            if !outcome.empty_clusters.is_empty() {
                warn!(iteration = iterations, clusters = ?outcome.empty_clusters, "empty clusters");
            }

            if !outcome.changed {
                break Termination::Converged;
            }
            iterations += 1;
            if max_iterations > 0 && iterations >= max_iterations {
                break Termination::IterationLimit;
            }

            if self.config.empty_clusters == EmptyClusterPolicy::Reseed {
                reseed_empty(&mut centroids, points, &outcome.empty_clusters, &mut rng);
            }
            centroids.update_sum_of_squares();
            info!(
                iteration = iterations - 1,
                sse = centroids.within_sse(points),
                "within cluster SSE"
            );
        };

        centroids.update_sum_of_squares();
        let within_sse = centroids.within_sse(points);
        let labels = points
            .iter()
            .enumerate()
            .map(|(i, p)| p.cluster().ok_or(KMeansError::UnassignedPoint(i)))
            .collect::<Result<Vec<_>>>()?;
        let empty_clusters = centroids
            .counts()
            .iter()
            .enumerate()
            .filter(|(_, &n)| n == 0)
            .map(|(c, _)| c)
            .collect();

        info!(iterations, ?termination, within_sse, "k-means finished");
        Ok(KMeansResult {
            centroids,
            labels,
            iterations,
            termination,
            within_sse,
            empty_clusters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use crate::point::{DensePoint, SparsePoint};
    use ndarray::array;

    fn two_groups() -> Vec<DensePoint> {
        [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [10.0, 10.0], [10.0, 11.0], [11.0, 10.0]]
            .iter()
            .map(|c| DensePoint::new(c.to_vec()))
            .collect()
    }

    #[test]
    fn converges_from_seeded_centroids() {
        let mut points = two_groups();
        let initial = CentroidSet::from_coords(array![[0.0, 0.0], [10.0, 10.0]]);
        let result = KMeans::new(KMeansConfig::new(2))
            .fit_from(&mut points, initial)
            .unwrap();

        assert_eq!(result.labels, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(result.iterations, 2);
        assert!(result.converged());
        assert!((result.centroids.row(0)[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((result.centroids.row(1)[1] - 31.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.cluster_sizes(), &[3, 3]);
    }

    #[test]
    fn iteration_cap_is_reported_separately() {
        let mut points = two_groups();
        let initial = CentroidSet::from_coords(array![[0.0, 0.0], [10.0, 10.0]]);
        let result = KMeans::new(KMeansConfig::new(2).with_max_iterations(2))
            .fit_from(&mut points, initial)
            .unwrap();
        assert_eq!(result.termination, Termination::IterationLimit);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn misconfiguration_fails_before_iterating() {
        let mut points = two_groups();
        assert!(matches!(
            KMeans::new(KMeansConfig::new(0)).fit(&mut points, 2),
            Err(KMeansError::InvalidConfig(_))
        ));
        assert!(matches!(
            KMeans::new(KMeansConfig::new(2)).fit(&mut points, 0),
            Err(KMeansError::InvalidConfig(_))
        ));
        assert!(matches!(
            KMeans::new(KMeansConfig::new(2)).fit(&mut points, 3),
            Err(KMeansError::DimensionMismatch { index: 0, .. })
        ));
        let mut none: Vec<DensePoint> = Vec::new();
        assert!(matches!(
            KMeans::new(KMeansConfig::new(2)).fit(&mut none, 2),
            Err(KMeansError::EmptyInput)
        ));
        // Nothing was touched.
        assert!(points.iter().all(|p| p.cluster().is_none()));
    }

    #[test]
    fn sparse_points_beyond_dimensions_are_rejected() {
        let mut points = vec![SparsePoint::new(vec![(5, 1.0)]).unwrap()];
        assert!(matches!(
            KMeans::new(KMeansConfig::new(1)).fit(&mut points, 5),
            Err(KMeansError::DimensionMismatch {
                index: 0,
                expected: 5,
                found: 6
            })
        ));
    }

    #[test]
    fn runs_inside_a_dedicated_pool() {
        let mut points = two_groups();
        let config = KMeansConfig::new(2)
            .with_init(InitStrategy::DistinctSample)
            .with_threads(2)
            .with_seed(3);
        let result = KMeans::new(config).fit(&mut points, 2).unwrap();
        assert!(result.converged());
        assert_eq!(result.labels.len(), 6);
    }

    #[test]
    fn reseed_policy_keeps_results_well_formed() {
        // Five identical points and three clusters: two stay empty whatever
        // happens to them.
        let mut points: Vec<DensePoint> = (0..5).map(|_| DensePoint::new(vec![1.0, 1.0])).collect();
        let config = KMeansConfig::new(3)
            .with_empty_clusters(EmptyClusterPolicy::Reseed)
            .with_execution(ExecutionMode::Sequential)
            .with_max_iterations(10);
        let result = KMeans::new(config).fit(&mut points, 2).unwrap();
        assert_eq!(result.labels.len(), 5);
        assert!(result.labels.iter().all(|&c| c < 3));
        assert_eq!(result.within_sse, 0.0);
    }
}
