//! Point representations shared by the clustering engine.
//!
//! Points are either dense (`DensePoint`, all D coordinates) or sparse
//! (`SparsePoint`, nonzero entries only). Centroids are always dense, which is
//! what makes the sparse distance cheap: it only touches the point's nonzeros
//! plus the centroid's cached sum of squares.

mod dense;
mod sparse;

pub use dense::DensePoint;
pub use sparse::SparsePoint;

use ndarray::{ArrayView1, ArrayViewMut1};

/// Read-only view of one centroid row.
#[derive(Clone, Copy, Debug)]
pub struct Centroid<'a> {
    pub coords: ArrayView1<'a, f64>,
    /// Cached sum of squared coordinates; only current after
    /// `CentroidSet::update_sum_of_squares`.
    pub sum_of_squares: f64,
}

/// Capabilities the clustering engine needs from a point.
///
/// The driver is generic over this trait, so the representation is picked
/// once per run and the inner loop is monomorphized.
pub trait Point: Send + Sync {
    /// Whether `squared_distance` reads `Centroid::sum_of_squares`.
    const NEEDS_CENTROID_NORMS: bool;

    /// Current cluster label, `None` while unassigned.
    fn cluster(&self) -> Option<usize>;

    fn set_cluster(&mut self, cluster: Option<usize>);

    fn squared_distance(&self, centroid: &Centroid<'_>) -> f64;

    /// Add this point's coordinates into a dense accumulator row.
    fn accumulate_into(&self, sums: ArrayViewMut1<'_, f64>);

    /// Overwrite a dense row with this point's coordinates.
    fn write_into(&self, coords: ArrayViewMut1<'_, f64>);

    /// Coordinate-wise equality against a dense row.
    fn equals_point(&self, coords: ArrayView1<'_, f64>) -> bool;

    /// Zero every stored coordinate value.
    fn clear(&mut self);

    fn update_sum_of_squares(&mut self);

    fn sum_of_squares(&self) -> f64;

    /// Smallest dimensionality that can hold this point.
    fn required_dimensions(&self) -> usize;

    /// Whether the point can live in a D-dimensional space.
    fn fits(&self, dimensions: usize) -> bool;
}
