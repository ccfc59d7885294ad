use crate::error::Result;
use crate::kmeans::{KMeans, KMeansResult};
use crate::point::{DensePoint, Point, SparsePoint};

/// A homogeneous collection of points.
#[derive(Clone, Debug)]
pub enum Points {
    Dense(Vec<DensePoint>),
    Sparse(Vec<SparsePoint>),
}

impl Points {
    pub fn len(&self) -> usize {
        match self {
            Points::Dense(points) => points.len(),
            Points::Sparse(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Labels currently carried by the points.
    pub fn labels(&self) -> Vec<Option<usize>> {
        match self {
            Points::Dense(points) => points.iter().map(|p| p.cluster()).collect(),
            Points::Sparse(points) => points.iter().map(|p| p.cluster()).collect(),
        }
    }
}

/// A named table of points with one attribute name per dimension.
#[derive(Clone, Debug)]
pub struct VectorStore {
    pub relation: String,
    pub attributes: Vec<String>,
    pub points: Points,
}

impl VectorStore {
    pub fn new(relation: impl Into<String>, attributes: Vec<String>, points: Points) -> Self {
        VectorStore {
            relation: relation.into(),
            attributes,
            points,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.attributes.len()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.points, Points::Sparse(_))
    }

    /// Expand sparse points to dense ones.
    pub fn into_dense(self) -> Self {
        let dimensions = self.dimensions();
        let points = match self.points {
            Points::Sparse(points) => {
                Points::Dense(points.iter().map(|p| p.to_dense(dimensions)).collect())
            }
            dense => dense,
        };
        VectorStore { points, ..self }
    }

    /// Cluster the store's points, picking the representation once.
    pub fn cluster(&mut self, kmeans: &KMeans) -> Result<KMeansResult> {
        let dimensions = self.dimensions();
        match &mut self.points {
            Points::Dense(points) => kmeans.fit(points, dimensions),
            Points::Sparse(points) => kmeans.fit(points, dimensions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KMeansConfig;

    fn sparse_store() -> VectorStore {
        let points = vec![
            SparsePoint::new(vec![(0, 1.0)]).unwrap(),
            SparsePoint::new(vec![(0, 1.5), (2, 0.5)]).unwrap(),
            SparsePoint::new(vec![(1, 9.0), (2, 9.0)]).unwrap(),
            SparsePoint::new(vec![(1, 8.0), (2, 9.5)]).unwrap(),
        ];
        VectorStore::new(
            "toy",
            vec!["a".into(), "b".into(), "c".into()],
            Points::Sparse(points),
        )
    }

    #[test]
    fn into_dense_keeps_coordinates() {
        let store = sparse_store().into_dense();
        assert!(!store.is_sparse());
        match &store.points {
            Points::Dense(points) => {
                assert_eq!(points[1].coords().to_vec(), vec![1.5, 0.0, 0.5]);
            }
            Points::Sparse(_) => panic!("expected dense points"),
        }
    }

    #[test]
    fn sparse_and_dense_runs_agree() {
        let config = KMeansConfig::new(2).with_seed(4);
        let mut sparse = sparse_store();
        let mut dense = sparse_store().into_dense();

        let a = sparse.cluster(&KMeans::new(config.clone())).unwrap();
        let b = dense.cluster(&KMeans::new(config)).unwrap();

        assert_eq!(a.labels, b.labels);
        assert_eq!(a.iterations, b.iterations);
        assert!((a.within_sse - b.within_sse).abs() < 1e-9);
        assert_eq!(sparse.points.labels(), dense.points.labels());
    }
}
