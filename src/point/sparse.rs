use super::{Centroid, DensePoint, Point};
use crate::error::{KMeansError, Result};
use ndarray::{Array1, ArrayView1, ArrayViewMut1};

/// A point that stores only its explicit (index, value) entries.
///
/// Indices are strictly increasing; every position not listed is zero.
#[derive(Clone, Debug)]
pub struct SparsePoint {
    indices: Vec<u32>,
    values: Vec<f64>,
    sum_of_squares: f64,
    cluster: Option<usize>,
}

impl SparsePoint {
    /// Build from (index, value) pairs, which must be strictly increasing by index.
    pub fn new(entries: Vec<(usize, f64)>) -> Result<Self> {
        let mut indices = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        for (position, (index, value)) in entries.into_iter().enumerate() {
            let index = u32::try_from(index).map_err(|_| KMeansError::InvalidSparseEntry {
                position,
                reason: format!("index {} does not fit in 32 bits", index),
            })?;
            if let Some(&prev) = indices.last() {
                if index <= prev {
                    return Err(KMeansError::InvalidSparseEntry {
                        position,
                        reason: format!("index {} follows index {}", index, prev),
                    });
                }
            }
            indices.push(index);
            values.push(value);
        }
        Ok(Self::from_parts(indices, values))
    }

    /// Sort by index first, then validate. Duplicate indices are still rejected.
    pub fn from_unsorted(mut entries: Vec<(usize, f64)>) -> Result<Self> {
        entries.sort_by_key(|&(index, _)| index);
        Self::new(entries)
    }

    fn from_parts(indices: Vec<u32>, values: Vec<f64>) -> Self {
        let mut point = SparsePoint {
            indices,
            values,
            sum_of_squares: 0.0,
            cluster: None,
        };
        point.update_sum_of_squares();
        point
    }

    /// Lossless conversion keeping exactly the nonzero coordinates.
    pub fn from_dense(point: &DensePoint) -> Self {
        let (indices, values) = point
            .coords()
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0.0)
            .map(|(i, &v)| (i as u32, v))
            .unzip();
        let mut sparse = Self::from_parts(indices, values);
        sparse.cluster = point.cluster();
        sparse
    }

    pub fn to_dense(&self, dimensions: usize) -> DensePoint {
        let mut coords = Array1::zeros(dimensions);
        self.write_into(coords.view_mut());
        let mut dense = DensePoint::from_array(coords);
        dense.set_cluster(self.cluster);
        dense
    }

    pub fn nonzeros(&self) -> usize {
        self.indices.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices
            .iter()
            .zip(&self.values)
            .map(|(&i, &v)| (i as usize, v))
    }

    /// Stored entries with mutable values. Call `update_sum_of_squares`
    /// after changing them.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = (usize, &mut f64)> + '_ {
        self.indices
            .iter()
            .zip(self.values.iter_mut())
            .map(|(&i, v)| (i as usize, v))
    }
}

impl Point for SparsePoint {
    const NEEDS_CENTROID_NORMS: bool = true;

    fn cluster(&self) -> Option<usize> {
        self.cluster
    }

    fn set_cluster(&mut self, cluster: Option<usize>) {
        self.cluster = cluster;
    }

    /// |c|² + Σ v·(v − 2·c[i]) over the nonzeros, i.e. |p − c|² without
    /// touching the zero coordinates.
    #[inline]
    fn squared_distance(&self, centroid: &Centroid<'_>) -> f64 {
        let mut sum = centroid.sum_of_squares;
        for (&i, &v) in self.indices.iter().zip(&self.values) {
            sum += v * (v - 2.0 * centroid.coords[i as usize]);
        }
        sum
    }

    fn accumulate_into(&self, mut sums: ArrayViewMut1<'_, f64>) {
        for (&i, &v) in self.indices.iter().zip(&self.values) {
            sums[i as usize] += v;
        }
    }

    fn write_into(&self, mut coords: ArrayViewMut1<'_, f64>) {
        coords.fill(0.0);
        for (&i, &v) in self.indices.iter().zip(&self.values) {
            coords[i as usize] = v;
        }
    }

    fn equals_point(&self, coords: ArrayView1<'_, f64>) -> bool {
        let mut entries = self.entries().peekable();
        for (i, &c) in coords.iter().enumerate() {
            let expected = match entries.peek() {
                Some(&(index, v)) if index == i => {
                    entries.next();
                    v
                }
                _ => 0.0,
            };
            if c != expected {
                return false;
            }
        }
        // Anything left lies beyond the dense point's length.
        entries.next().is_none()
    }

    /// Zero the stored values. The index set stays, so the ordering invariant holds.
    fn clear(&mut self) {
        self.values.fill(0.0);
        self.sum_of_squares = 0.0;
    }

    fn update_sum_of_squares(&mut self) {
        self.sum_of_squares = self.values.iter().map(|v| v * v).sum();
    }

    fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    fn required_dimensions(&self) -> usize {
        self.indices.last().map_or(0, |&i| i as usize + 1)
    }

    fn fits(&self, dimensions: usize) -> bool {
        self.required_dimensions() <= dimensions
    }
}

impl PartialEq<DensePoint> for SparsePoint {
    fn eq(&self, other: &DensePoint) -> bool {
        self.equals_point(other.coords())
    }
}

impl PartialEq for SparsePoint {
    fn eq(&self, other: &SparsePoint) -> bool {
        // Explicit zeros must not make otherwise equal points differ.
        let mut a = self.entries().filter(|&(_, v)| v != 0.0);
        let mut b = other.entries().filter(|&(_, v)| v != 0.0);
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some(x), Some(y)) if x == y => continue,
                _ => return false,
            }
        }
    }
}
