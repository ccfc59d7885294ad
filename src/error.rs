use thiserror::Error;

/// Errors produced while configuring, loading or running a clustering.
#[derive(Debug, Error)]
pub enum KMeansError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no points to cluster")]
    EmptyInput,

    #[error("point {index} does not fit {expected} dimensions (needs {found})")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid sparse entry at position {position}: {reason}")]
    InvalidSparseEntry { position: usize, reason: String },

    #[error("label {label:?} is not a cluster index below {num_clusters}")]
    InvalidLabel {
        label: Option<usize>,
        num_clusters: usize,
    },

    #[error("point {0} has no cluster label")]
    UnassignedPoint(usize),

    #[error("requested {requested} distinct seed centroids but only {found} distinct points exist")]
    InsufficientDistinctPoints { requested: usize, found: usize },

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, KMeansError>;
