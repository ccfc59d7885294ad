use crate::centroids::CentroidSet;
use crate::point::Point;
use crate::reducer::CentroidReducer;
use std::sync::atomic::{AtomicBool, Ordering};

/// What one assignment pass observed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IterationOutcome {
    /// At least one point moved to a different cluster.
    pub changed: bool,
    /// Clusters left without points; their centroids are the zero vector.
    pub empty_clusters: Vec<usize>,
}

/// Index of the nearest centroid. Ties go to the lowest index.
#[inline]
pub fn nearest_centroid<P: Point>(point: &P, centroids: &CentroidSet) -> usize {
    let mut best_c = 0;
    let mut best_dist = f64::INFINITY;
    for c in 0..centroids.num_clusters() {
        let dist = point.squared_distance(&centroids.centroid(c));
        if dist < best_dist {
            best_dist = dist;
            best_c = c;
        }
    }
    best_c
}

/// One k-means iteration: assign every point to its nearest centroid,
/// accumulate the new sums through the reducer, normalize them and install
/// them as the current centroids.
///
/// `centroids` is only read while points are assigned; the new sums live in
/// the reducer's views until the swap at the end.
pub fn cluster_once<P: Point>(
    centroids: &mut CentroidSet,
    points: &mut [P],
    reducer: &CentroidReducer,
) -> IterationOutcome {
    if P::NEEDS_CENTROID_NORMS {
        centroids.update_sum_of_squares();
    }

    // Every writer stores `true`, so relaxed ordering is enough; the join in
    // `accumulate` orders all stores before the final load.
    let changed = AtomicBool::new(false);
    let mut merged = {
        let current: &CentroidSet = centroids;
        reducer.accumulate(points, |point| {
            let nearest = nearest_centroid(point, current);
            if point.cluster() != Some(nearest) {
                changed.store(true, Ordering::Relaxed);
                point.set_cluster(Some(nearest));
            }
            nearest
        })
    };

    let empty_clusters = merged.normalize();
    centroids.swap(&mut merged);

    IterationOutcome {
        changed: changed.into_inner(),
        empty_clusters,
    }
}
