//! Fork-join accumulation of points into centroid sums.
//!
//! `CentroidSet` forms a monoid: `CentroidSet::new(k, d)` is the identity and
//! `CentroidSet::reduce` the (associative, commutative) combine. The points are
//! cut into fixed chunks whose length depends only on the number of points.
//! Each chunk is folded into a private view and the views are merged in chunk
//! order, so the sums do not depend on the pool size or on how rayon schedules
//! the chunks. Sequential mode walks the same chunks and gets the same bits.

use crate::centroids::CentroidSet;
use crate::config::ExecutionMode;
use crate::point::Point;
use rayon::prelude::*;

/// Upper bound on the number of partial views alive in one pass.
const MAX_PARTIALS: usize = 64;

/// Fewest points folded into one partial view.
const MIN_CHUNK_LEN: usize = 256;

/// Chunk length used for `num_points` points.
pub fn chunk_len(num_points: usize) -> usize {
    ((num_points + MAX_PARTIALS - 1) / MAX_PARTIALS).max(MIN_CHUNK_LEN)
}

pub struct CentroidReducer {
    num_clusters: usize,
    dimensions: usize,
    mode: ExecutionMode,
}

impl CentroidReducer {
    pub fn new(num_clusters: usize, dimensions: usize, mode: ExecutionMode) -> Self {
        CentroidReducer {
            num_clusters,
            dimensions,
            mode,
        }
    }

    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// The all-zero accumulator.
    pub fn identity(&self) -> CentroidSet {
        CentroidSet::new(self.num_clusters, self.dimensions)
    }

    pub fn combine(mut left: CentroidSet, right: CentroidSet) -> CentroidSet {
        left.reduce(&right);
        left
    }

    /// Run `assign` on every point and accumulate the point into the cluster
    /// it returns. `assign` may update the point (its label) but must not
    /// depend on other points.
    pub fn accumulate<P, F>(&self, points: &mut [P], assign: F) -> CentroidSet
    where
        P: Point,
        F: Fn(&mut P) -> usize + Sync + Send,
    {
        let chunk_len = chunk_len(points.len());
        match self.mode {
            ExecutionMode::Parallel => {
                let partials: Vec<CentroidSet> = points
                    .par_chunks_mut(chunk_len)
                    .map(|chunk| {
                        let mut view = self.identity();
                        fold_chunk(&mut view, chunk, &assign);
                        view
                    })
                    .collect();
                partials.into_iter().fold(self.identity(), Self::combine)
            }
            ExecutionMode::Sequential => {
                let mut total = self.identity();
                let mut view = self.identity();
                for chunk in points.chunks_mut(chunk_len) {
                    view.clear();
                    fold_chunk(&mut view, chunk, &assign);
                    total.reduce(&view);
                }
                total
            }
        }
    }
}

fn fold_chunk<P, F>(view: &mut CentroidSet, chunk: &mut [P], assign: &F)
where
    P: Point,
    F: Fn(&mut P) -> usize,
{
    for point in chunk.iter_mut() {
        let cluster = assign(point);
        view.accumulate(cluster, point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::DensePoint;

    fn points(n: usize) -> Vec<DensePoint> {
        (0..n)
            .map(|i| DensePoint::new(vec![i as f64, (i % 7) as f64]))
            .collect()
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let mut a = points(1000);
        let mut b = points(1000);
        let assign = |p: &mut DensePoint| {
            let c = (p.coords()[1] as usize) % 3;
            p.set_cluster(Some(c));
            c
        };

        let par = CentroidReducer::new(3, 2, ExecutionMode::Parallel).accumulate(&mut a, assign);
        let seq = CentroidReducer::new(3, 2, ExecutionMode::Sequential).accumulate(&mut b, assign);

        assert_eq!(par.coords(), seq.coords());
        assert_eq!(par.counts(), seq.counts());
        assert_eq!(par.counts().iter().sum::<usize>(), 1000);
        assert!(a.iter().zip(&b).all(|(x, y)| x.cluster() == y.cluster()));
    }

    #[test]
    fn sums_are_bit_identical_across_modes_and_pool_sizes() {
        // Fractional values of mixed magnitude, so summation order shows up
        // in the low bits.
        let base: Vec<DensePoint> = (0..50_000)
            .map(|i| {
                let x = i as f64;
                DensePoint::new(vec![(x * 0.37).sin() * 1e3, 1.0 / (x + 1.0), x.sqrt() * 1e-3])
            })
            .collect();
        assert!(base.len() > chunk_len(base.len()));
        let assign = |p: &mut DensePoint| {
            let c = (p.coords()[0].abs() as usize) % 5;
            p.set_cluster(Some(c));
            c
        };

        let run = |mode: ExecutionMode, threads: usize| {
            let mut pts = base.clone();
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap();
            pool.install(|| CentroidReducer::new(5, 3, mode).accumulate(&mut pts, assign))
        };

        let seq = run(ExecutionMode::Sequential, 1);
        for threads in [1, 2, 4, 7] {
            let par = run(ExecutionMode::Parallel, threads);
            assert_eq!(par.counts(), seq.counts());
            for (x, y) in par.coords().iter().zip(seq.coords().iter()) {
                assert_eq!(x.to_bits(), y.to_bits(), "{} threads", threads);
            }
        }
    }

    #[test]
    fn chunk_length_depends_only_on_point_count() {
        assert_eq!(chunk_len(0), MIN_CHUNK_LEN);
        assert_eq!(chunk_len(1000), MIN_CHUNK_LEN);
        assert_eq!(chunk_len(MAX_PARTIALS * 1000), 1000);
        assert_eq!(chunk_len(MAX_PARTIALS * 1000 + 1), 1001);
    }

    #[test]
    fn empty_input_yields_identity() {
        let mut none: Vec<DensePoint> = Vec::new();
        let reducer = CentroidReducer::new(2, 3, ExecutionMode::Parallel);
        let out = reducer.accumulate(&mut none, |_| 0);
        assert_eq!(out.counts(), &[0, 0]);
        assert!(out.coords().iter().all(|&x| x == 0.0));
    }
}
