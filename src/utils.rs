use ndarray::ArrayView1;
use wide::f64x4;

/// Squared Euclidean distance between two equally long vectors.
///
/// Contiguous views go through the 4-lane SIMD kernel; strided views fall back
/// to a plain loop.
#[inline]
pub fn squared_euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    match (a.as_slice(), b.as_slice()) {
        (Some(a), Some(b)) => squared_euclidean_simd(a, b),
        _ => a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| {
                let diff = x - y;
                diff * diff
            })
            .sum(),
    }
}

/// Compute squared distance between two slices using SIMD
#[inline]
pub fn squared_euclidean_simd(a: &[f64], b: &[f64]) -> f64 {
    let dim = a.len().min(b.len());
    let (a, b) = (&a[..dim], &b[..dim]);

    let mut acc4 = f64x4::splat(0.0);
    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let (a_tail, b_tail) = (a_chunks.remainder(), b_chunks.remainder());
    for (pa, pb) in a_chunks.zip(b_chunks) {
        let va = f64x4::from([pa[0], pa[1], pa[2], pa[3]]);
        let vb = f64x4::from([pb[0], pb[1], pb[2], pb[3]]);
        let diff = va - vb;
        acc4 += diff * diff;
    }

    // Tail elements
    let mut tail = 0.0;
    for (x, y) in a_tail.iter().zip(b_tail) {
        let diff = x - y;
        tail += diff * diff;
    }

    acc4.reduce_add() + tail
}

/// Sum of squared components.
#[inline]
pub fn sum_of_squares(v: ArrayView1<f64>) -> f64 {
    v.iter().map(|x| x * x).sum()
}
