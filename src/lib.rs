//! Parallel shared-memory k-means over dense and sparse points.
//!
//! Points are read from ARFF files or built from a directory of text
//! documents as TF-IDF vectors, optionally min-max normalized, clustered with
//! [`KMeans`] and summarized with [`report::write_report`].

pub mod arff;
pub mod centroids;
pub mod config;
pub mod error;
pub mod kmeans;
pub mod normalize;
pub mod point;
pub mod reducer;
pub mod report;
pub mod tfidf;
pub mod utils;
pub mod vector_store;

pub use centroids::CentroidSet;
pub use config::{EmptyClusterPolicy, ExecutionMode, InitStrategy, KMeansConfig};
pub use error::{KMeansError, Result};
pub use kmeans::{KMeans, KMeansResult, Termination};
pub use normalize::{min_max_normalize, Extrema};
pub use point::{DensePoint, Point, SparsePoint};
pub use vector_store::{Points, VectorStore};
