//! Min-max scaling of every attribute into `[0, 1)`.

use crate::point::{DensePoint, Point, SparsePoint};
use crate::vector_store::{Points, VectorStore};
use rayon::prelude::*;
use tracing::debug;

/// Observed range of one attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
}

impl Extrema {
    pub const EMPTY: Extrema = Extrema {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn merge(self, other: Extrema) -> Extrema {
        Extrema {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }

    /// `(v - min) / (max - min + 1)`; a constant attribute maps to 1.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_constant() {
            1.0
        } else {
            (value - self.min) / (self.max - self.min + 1.0)
        }
    }

    pub fn denormalize(&self, value: f64) -> f64 {
        if self.is_constant() {
            self.min
        } else {
            self.min + value * (self.max - self.min + 1.0)
        }
    }
}

/// Per-attribute extrema. For sparse points an attribute missing from any row
/// also observes the implicit zero.
pub fn extrema(points: &Points, dimensions: usize) -> Vec<Extrema> {
    match points {
        Points::Dense(points) => dense_extrema(points, dimensions),
        Points::Sparse(points) => sparse_extrema(points, dimensions),
    }
}

fn merge_all(left: Vec<Extrema>, right: Vec<Extrema>) -> Vec<Extrema> {
    left.into_iter().zip(right).map(|(l, r)| l.merge(r)).collect()
}

fn dense_extrema(points: &[DensePoint], dimensions: usize) -> Vec<Extrema> {
    points
        .par_iter()
        .fold(
            || vec![Extrema::EMPTY; dimensions],
            |mut acc, point| {
                for (e, &v) in acc.iter_mut().zip(point.coords().iter()) {
                    e.observe(v);
                }
                acc
            },
        )
        .reduce(|| vec![Extrema::EMPTY; dimensions], merge_all)
}

fn sparse_extrema(points: &[SparsePoint], dimensions: usize) -> Vec<Extrema> {
    let (mut extrema, occurrences) = points
        .par_iter()
        .fold(
            || (vec![Extrema::EMPTY; dimensions], vec![0usize; dimensions]),
            |(mut acc, mut seen), point| {
                for (i, v) in point.entries() {
                    acc[i].observe(v);
                    seen[i] += 1;
                }
                (acc, seen)
            },
        )
        .reduce(
            || (vec![Extrema::EMPTY; dimensions], vec![0usize; dimensions]),
            |(la, ls), (ra, rs)| {
                let seen = ls.iter().zip(&rs).map(|(a, b)| a + b).collect();
                (merge_all(la, ra), seen)
            },
        );

    for (e, &n) in extrema.iter_mut().zip(&occurrences) {
        if n < points.len() {
            e.observe(0.0);
        }
    }
    extrema
}

/// Scale every attribute of the store in place and return the extrema needed
/// to undo it. Sparse rows only rescale their stored entries.
pub fn min_max_normalize(store: &mut VectorStore) -> Vec<Extrema> {
    let dimensions = store.dimensions();
    let extrema = extrema(&store.points, dimensions);

    match &mut store.points {
        Points::Dense(points) => points.par_iter_mut().for_each(|point| {
            for (v, e) in point.coords_mut().iter_mut().zip(&extrema) {
                *v = e.normalize(*v);
            }
            point.update_sum_of_squares();
        }),
        Points::Sparse(points) => points.par_iter_mut().for_each(|point| {
            for (i, v) in point.entries_mut() {
                *v = extrema[i].normalize(*v);
            }
            point.update_sum_of_squares();
        }),
    }

    debug!(
        dimensions,
        constant = extrema.iter().filter(|e| e.is_constant()).count(),
        "normalized attributes"
    );
    extrema
}
