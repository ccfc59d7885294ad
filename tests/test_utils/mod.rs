use ndarray::ArrayView2;
use parallel_kmeans::{DensePoint, SparsePoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt::Write;

/// Create synthetic data with well-separated Gaussian-ish clusters
/// Returns (points, true_labels)
#[allow(dead_code)]
pub fn create_gaussian_clusters(
    num_clusters: usize,
    points_per_cluster: usize,
    dim: usize,
    separation: f64,
    seed: u64,
) -> (Vec<DensePoint>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut points = Vec::with_capacity(num_clusters * points_per_cluster);
    let mut true_labels = Vec::with_capacity(num_clusters * points_per_cluster);

    for cluster_id in 0..num_clusters {
        let center: Vec<f64> = (0..dim)
            .map(|d| (cluster_id as f64) * separation + (d as f64) * 0.1)
            .collect();

        for _ in 0..points_per_cluster {
            let coords = center
                .iter()
                .map(|&c| c + rng.gen_range(-0.5..0.5))
                .collect();
            points.push(DensePoint::new(coords));
            true_labels.push(cluster_id);
        }
    }

    (points, true_labels)
}

/// Generate deterministic random points (for reproducibility)
#[allow(dead_code)]
pub fn create_deterministic_points(n: usize, dim: usize, seed: u64) -> Vec<DensePoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| DensePoint::new((0..dim).map(|_| rng.gen_range(-10.0..10.0)).collect()))
        .collect()
}

/// Random points where roughly `density` of the coordinates are nonzero
#[allow(dead_code)]
pub fn create_sparse_points(n: usize, dim: usize, density: f64, seed: u64) -> Vec<DensePoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let coords = (0..dim)
                .map(|_| {
                    if rng.gen_bool(density) {
                        rng.gen_range(0.0..5.0)
                    } else {
                        0.0
                    }
                })
                .collect();
            DensePoint::new(coords)
        })
        .collect()
}

#[allow(dead_code)]
pub fn to_sparse(points: &[DensePoint]) -> Vec<SparsePoint> {
    points.iter().map(SparsePoint::from_dense).collect()
}

/// Calculate squared Euclidean distance
#[allow(dead_code)]
pub fn euclidean_distance_squared(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Calculate the within-cluster sum of squares (inertia) by brute force
#[allow(dead_code)]
pub fn calculate_inertia(
    points: &[DensePoint],
    centroids: ArrayView2<f64>,
    labels: &[usize],
) -> f64 {
    points
        .iter()
        .zip(labels)
        .map(|(p, &label)| {
            euclidean_distance_squared(&p.coords().to_vec(), &centroids.row(label).to_vec())
        })
        .sum()
}

/// Verify that each point is assigned to its nearest centroid
#[allow(dead_code)]
pub fn verify_optimal_assignment(
    points: &[DensePoint],
    centroids: ArrayView2<f64>,
    labels: &[usize],
) -> bool {
    for (p, &assigned_label) in points.iter().zip(labels) {
        let coords = p.coords().to_vec();
        let assigned_dist = euclidean_distance_squared(&coords, &centroids.row(assigned_label).to_vec());

        for c in 0..centroids.nrows() {
            let dist = euclidean_distance_squared(&coords, &centroids.row(c).to_vec());
            if dist < assigned_dist - 1e-9 {
                return false;
            }
        }
    }
    true
}

/// True if both labelings describe the same partition up to renaming
#[allow(dead_code)]
pub fn same_partition(a: &[usize], b: &[usize]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut forward = HashMap::new();
    let mut backward = HashMap::new();
    a.iter().zip(b).all(|(&x, &y)| {
        *forward.entry(x).or_insert(y) == y && *backward.entry(y).or_insert(x) == x
    })
}

/// Render dense points as an ARFF document
#[allow(dead_code)]
pub fn to_arff(relation: &str, points: &[DensePoint]) -> String {
    let dim = points.first().map_or(0, |p| p.dimensions());
    let mut text = format!("@relation {}\n", relation);
    for d in 0..dim {
        writeln!(text, "@attribute a{} numeric", d).unwrap();
    }
    text.push_str("@data\n");
    for p in points {
        let row: Vec<String> = p.coords().iter().map(|v| v.to_string()).collect();
        writeln!(text, "{}", row.join(",")).unwrap();
    }
    text
}
