use parallel_kmeans::{
    min_max_normalize, report, DensePoint, KMeans, KMeansConfig, Points, SparsePoint,
    VectorStore,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() {
    println!("Starting parallel-kmeans demo.");

    let dim = 4;
    let k = 3;
    let mut rng = StdRng::seed_from_u64(7);
    let points: Vec<DensePoint> = (0..3000)
        .map(|i| {
            let center = (i % k) as f64 * 10.0;
            DensePoint::new((0..dim).map(|_| center + rng.gen_range(-2.0..2.0)).collect())
        })
        .collect();

    let attributes = (0..dim).map(|d| format!("x{}", d)).collect();
    let mut store = VectorStore::new("blobs", attributes, Points::Dense(points));
    let extrema = min_max_normalize(&mut store);

    let config = KMeansConfig::new(k).with_seed(1);
    let result = store
        .cluster(&KMeans::new(config))
        .expect("Clustering failed");

    println!(
        "{} points, {} iterations, converged: {}, SSE {:.4}",
        store.len(),
        result.iterations,
        result.converged(),
        result.within_sse
    );

    // Same data as sparse vectors.
    let mut sparse = store.clone();
    if let Points::Dense(points) = &store.points {
        sparse.points = Points::Sparse(points.iter().map(SparsePoint::from_dense).collect());
    }
    let sparse_result = sparse
        .cluster(&KMeans::new(KMeansConfig::new(k).with_seed(1)))
        .expect("Clustering failed");
    println!(
        "sparse run: {} iterations, same labels: {}",
        sparse_result.iterations,
        sparse_result.labels == result.labels
    );

    let mut out = std::io::stdout();
    report::write_report(&mut out, &store.attributes, &result, Some(&extrema))
        .expect("Failed to write report");
}
