use super::{Centroid, Point, SparsePoint};
use crate::utils::{squared_euclidean, sum_of_squares};
use ndarray::{Array1, ArrayView1, ArrayViewMut1};

/// A point with all D coordinates stored.
#[derive(Clone, Debug)]
pub struct DensePoint {
    coords: Array1<f64>,
    sum_of_squares: f64,
    cluster: Option<usize>,
}

impl DensePoint {
    pub fn new(coords: Vec<f64>) -> Self {
        Self::from_array(Array1::from_vec(coords))
    }

    pub fn from_array(coords: Array1<f64>) -> Self {
        let sum_of_squares = sum_of_squares(coords.view());
        DensePoint {
            coords,
            sum_of_squares,
            cluster: None,
        }
    }

    pub fn coords(&self) -> ArrayView1<'_, f64> {
        self.coords.view()
    }

    pub fn dimensions(&self) -> usize {
        self.coords.len()
    }

    /// Mutable access to the coordinates. The sum-of-squares cache is stale
    /// afterwards until `update_sum_of_squares` runs.
    pub fn coords_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.coords.view_mut()
    }
}

impl Point for DensePoint {
    const NEEDS_CENTROID_NORMS: bool = false;

    fn cluster(&self) -> Option<usize> {
        self.cluster
    }

    fn set_cluster(&mut self, cluster: Option<usize>) {
        self.cluster = cluster;
    }

    #[inline]
    fn squared_distance(&self, centroid: &Centroid<'_>) -> f64 {
        squared_euclidean(self.coords.view(), centroid.coords)
    }

    fn accumulate_into(&self, mut sums: ArrayViewMut1<'_, f64>) {
        sums += &self.coords;
    }

    fn write_into(&self, mut coords: ArrayViewMut1<'_, f64>) {
        coords.assign(&self.coords);
    }

    fn equals_point(&self, coords: ArrayView1<'_, f64>) -> bool {
        self.coords.len() == coords.len()
            && self.coords.iter().zip(coords.iter()).all(|(a, b)| a == b)
    }

    fn clear(&mut self) {
        self.coords.fill(0.0);
        self.sum_of_squares = 0.0;
    }

    fn update_sum_of_squares(&mut self) {
        self.sum_of_squares = sum_of_squares(self.coords.view());
    }

    fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    fn required_dimensions(&self) -> usize {
        self.coords.len()
    }

    fn fits(&self, dimensions: usize) -> bool {
        self.coords.len() == dimensions
    }
}

impl PartialEq for DensePoint {
    fn eq(&self, other: &DensePoint) -> bool {
        self.equals_point(other.coords())
    }
}

impl PartialEq<SparsePoint> for DensePoint {
    fn eq(&self, other: &SparsePoint) -> bool {
        other.equals_point(self.coords())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn distance_is_sum_of_squared_differences() {
        let p = DensePoint::new(vec![1.0, 2.0, 3.0]);
        let c = array![0.0, 0.0, 1.0];
        let centroid = Centroid {
            coords: c.view(),
            sum_of_squares: 0.0,
        };
        assert_eq!(p.squared_distance(&centroid), 1.0 + 4.0 + 4.0);
    }

    #[test]
    fn accumulate_adds_every_coordinate() {
        let p = DensePoint::new(vec![1.0, -2.0]);
        let mut sums = array![10.0, 10.0];
        p.accumulate_into(sums.view_mut());
        p.accumulate_into(sums.view_mut());
        assert_eq!(sums, array![12.0, 6.0]);
    }

    #[test]
    fn sum_of_squares_cache_follows_updates() {
        let mut p = DensePoint::new(vec![3.0, 4.0]);
        assert_eq!(p.sum_of_squares(), 25.0);
        p.coords_mut()[0] = 0.0;
        assert_eq!(p.sum_of_squares(), 25.0);
        p.update_sum_of_squares();
        assert_eq!(p.sum_of_squares(), 16.0);
        p.clear();
        assert_eq!(p.coords(), array![0.0, 0.0].view());
        assert_eq!(p.sum_of_squares(), 0.0);
    }

    #[test]
    fn starts_unassigned() {
        let mut p = DensePoint::new(vec![1.0]);
        assert_eq!(p.cluster(), None);
        p.set_cluster(Some(3));
        assert_eq!(p.cluster(), Some(3));
    }

    #[test]
    fn fits_only_its_own_dimension() {
        let p = DensePoint::new(vec![1.0, 2.0]);
        assert!(p.fits(2));
        assert!(!p.fits(3));
    }
}
