use crate::error::{KMeansError, Result};
use crate::point::{Centroid, Point};
use crate::utils::sum_of_squares;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::mem;
use tracing::debug;

/// Random draws per requested centroid before `select` falls back to a sweep.
const SELECT_ATTEMPTS_PER_CLUSTER: usize = 32;

/// K centroid rows over one contiguous K×D buffer.
///
/// While accumulating, row `c` holds the running sum of the points assigned to
/// cluster `c` and `counts[c]` how many there were. After `normalize` the row
/// holds their mean; the count is kept as the cluster size.
#[derive(Clone, Debug)]
pub struct CentroidSet {
    coords: Array2<f64>,
    counts: Vec<usize>,
    sum_of_squares: Array1<f64>,
}

impl CentroidSet {
    pub fn new(num_clusters: usize, dimensions: usize) -> Self {
        CentroidSet {
            coords: Array2::zeros((num_clusters, dimensions)),
            counts: vec![0; num_clusters],
            sum_of_squares: Array1::zeros(num_clusters),
        }
    }

    /// Build from explicit centroid coordinates (counts start at 0).
    pub fn from_coords(coords: Array2<f64>) -> Self {
        let k = coords.nrows();
        let mut set = CentroidSet {
            coords,
            counts: vec![0; k],
            sum_of_squares: Array1::zeros(k),
        };
        set.update_sum_of_squares();
        set
    }

    pub fn num_clusters(&self) -> usize {
        self.coords.nrows()
    }

    pub fn dimensions(&self) -> usize {
        self.coords.ncols()
    }

    pub fn coords(&self) -> ArrayView2<'_, f64> {
        self.coords.view()
    }

    pub fn row(&self, cluster: usize) -> ArrayView1<'_, f64> {
        self.coords.row(cluster)
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn count(&self, cluster: usize) -> usize {
        self.counts[cluster]
    }

    #[inline]
    pub fn centroid(&self, cluster: usize) -> Centroid<'_> {
        Centroid {
            coords: self.coords.row(cluster),
            sum_of_squares: self.sum_of_squares[cluster],
        }
    }

    /// Zero coordinates, counts and caches, keeping the allocation.
    pub fn clear(&mut self) {
        self.coords.fill(0.0);
        self.counts.iter_mut().for_each(|n| *n = 0);
        self.sum_of_squares.fill(0.0);
    }

    /// Add `point` into the centroid named by its label.
    pub fn add_point<P: Point>(&mut self, point: &P) -> Result<()> {
        match point.cluster() {
            Some(c) if c < self.num_clusters() => {
                self.accumulate(c, point);
                Ok(())
            }
            label => Err(KMeansError::InvalidLabel {
                label,
                num_clusters: self.num_clusters(),
            }),
        }
    }

    #[inline]
    pub(crate) fn accumulate<P: Point>(&mut self, cluster: usize, point: &P) {
        point.accumulate_into(self.coords.row_mut(cluster));
        self.counts[cluster] += 1;
    }

    /// Turn running sums into means. Returns the clusters that had no points;
    /// those rows stay at the zero vector.
    pub fn normalize(&mut self) -> Vec<usize> {
        Zip::from(self.coords.rows_mut())
            .and(ArrayView1::from(&self.counts[..]))
            .par_for_each(|mut row, &count| {
                if count > 0 {
                    row /= count as f64;
                }
            });

        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count == 0)
            .map(|(c, _)| c)
            .collect()
    }

    /// Refresh every row's sum-of-squares cache.
    pub fn update_sum_of_squares(&mut self) {
        Zip::from(self.coords.rows())
            .and(&mut self.sum_of_squares)
            .par_for_each(|row, ssq| {
                *ssq = sum_of_squares(row);
            });
    }

    /// Seed the rows with K points drawn at random, skipping any point whose
    /// coordinates equal an already chosen row.
    ///
    /// Random draws are bounded; once they run out the points are swept in
    /// order for the remaining distinct vectors. Fails if fewer than K distinct
    /// vectors exist.
    pub fn select<P: Point>(&mut self, points: &[P], seed: u64) -> Result<()> {
        if points.is_empty() {
            return Err(KMeansError::EmptyInput);
        }
        self.clear();

        let k = self.num_clusters();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut chosen = 0;
        let mut attempts = 0;
        while chosen < k && attempts < SELECT_ATTEMPTS_PER_CLUSTER * k {
            attempts += 1;
            let pi = rng.gen_range(0..points.len());
            if self.try_accept(chosen, &points[pi]) {
                chosen += 1;
            }
        }

        if chosen < k {
            debug!(chosen, k, attempts, "random seeding exhausted, sweeping points");
            for point in points {
                if chosen == k {
                    break;
                }
                if self.try_accept(chosen, point) {
                    chosen += 1;
                }
            }
        }

        if chosen < k {
            return Err(KMeansError::InsufficientDistinctPoints {
                requested: k,
                found: chosen,
            });
        }
        self.update_sum_of_squares();
        Ok(())
    }

    fn try_accept<P: Point>(&mut self, slot: usize, point: &P) -> bool {
        let duplicate = (0..slot).any(|c| point.equals_point(self.coords.row(c)));
        if !duplicate {
            point.write_into(self.coords.row_mut(slot));
        }
        !duplicate
    }

    /// Overwrite one row with a point's coordinates.
    pub fn assign_row<P: Point>(&mut self, cluster: usize, point: &P) {
        point.write_into(self.coords.row_mut(cluster));
        self.sum_of_squares[cluster] = sum_of_squares(self.coords.row(cluster));
    }

    /// Merge another accumulator into this one. Associative and commutative,
    /// with `CentroidSet::new(k, d)` as identity.
    pub fn reduce(&mut self, other: &CentroidSet) {
        self.coords += &other.coords;
        for (n, m) in self.counts.iter_mut().zip(&other.counts) {
            *n += m;
        }
    }

    /// Exchange storage with `other` without copying.
    pub fn swap(&mut self, other: &mut CentroidSet) {
        mem::swap(self, other);
    }

    /// Within-cluster sum of squared errors over the points' current labels.
    /// Sparse points need current caches (`update_sum_of_squares`).
    pub fn within_sse<P: Point>(&self, points: &[P]) -> f64 {
        points
            .iter()
            .filter_map(|p| p.cluster().map(|c| p.squared_distance(&self.centroid(c))))
            .sum()
    }
}
