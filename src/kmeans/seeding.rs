use crate::centroids::CentroidSet;
use crate::error::Result;
use crate::point::Point;
use crate::reducer::CentroidReducer;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// Label every point uniformly at random, then average each label's points
/// through the reducer.
pub fn random_labels<P: Point>(
    points: &mut [P],
    reducer: &CentroidReducer,
    seed: u64,
) -> CentroidSet {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let num_clusters = reducer.num_clusters();
    for point in points.iter_mut() {
        point.set_cluster(Some(rng.gen_range(0..num_clusters)));
    }

    // Every point was labelled just above.
    let mut centroids = reducer.accumulate(points, |point| point.cluster().unwrap_or_default());
    let empty = centroids.normalize();
    if !empty.is_empty() {
        warn!(clusters = ?empty, "random labelling left clusters empty");
    }
    centroids
}

/// Copy K pairwise-distinct points as the starting centroids. Labels are reset
/// so the first assignment pass counts every point as moved.
pub fn distinct_sample<P: Point>(
    points: &mut [P],
    num_clusters: usize,
    dimensions: usize,
    seed: u64,
) -> Result<CentroidSet> {
    let mut centroids = CentroidSet::new(num_clusters, dimensions);
    centroids.select(points, seed)?;
    for point in points.iter_mut() {
        point.set_cluster(None);
    }
    Ok(centroids)
}

/// Move each empty centroid onto a randomly drawn point.
pub fn reseed_empty<P: Point>(
    centroids: &mut CentroidSet,
    points: &[P],
    empty: &[usize],
    rng: &mut ChaCha8Rng,
) {
    if points.is_empty() {
        return;
    }
    for &c in empty {
        let pi = rng.gen_range(0..points.len());
        centroids.assign_row(c, &points[pi]);
        debug!(cluster = c, point = pi, "reseeded empty cluster");
    }
}
