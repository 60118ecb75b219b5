//! Embedding matrix representations.

use ndarray::{Array2, ArrayView2, Axis, CowArray, Ix1};

/// Embedding matrix storage.
///
/// This trait abstracts over the way in which the *n x d* embedding
/// matrix is stored.
pub trait Storage {
    /// Get the embedding at row `idx`.
    fn embedding(&self, idx: usize) -> CowArray<f64, Ix1>;

    /// Get the shape of the embedding matrix.
    fn shape(&self) -> (usize, usize);
}

/// Storage that provide a view of the embedding matrix.
pub trait StorageView: Storage {
    /// Get a view of the embedding matrix.
    fn view(&self) -> ArrayView2<f64>;
}

/// In-memory `ndarray` matrix.
///
/// Embeddings are stored as they were read, they are not
/// normalized.
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray {
    inner: Array2<f64>,
}

impl NdArray {
    pub fn new(arr: Array2<f64>) -> Self {
        NdArray { inner: arr }
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.inner
    }
}

impl Storage for NdArray {
    fn embedding(&self, idx: usize) -> CowArray<f64, Ix1> {
        CowArray::from(self.inner.index_axis(Axis(0), idx))
    }

    fn shape(&self) -> (usize, usize) {
        self.inner.dim()
    }
}

impl StorageView for NdArray {
    fn view(&self) -> ArrayView2<f64> {
        self.inner.view()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, arr2};

    use super::{NdArray, Storage, StorageView};

    fn test_ndarray() -> NdArray {
        NdArray::new(arr2(&[[1., 2., 3.], [4., 5., 6.]]))
    }

    #[test]
    fn embedding_returns_row() {
        let storage = test_ndarray();
        assert_eq!(storage.embedding(1).view(), arr1(&[4., 5., 6.]));
        assert!(storage.embedding(0).is_view());
    }

    #[test]
    fn shape_and_view_match_matrix() {
        let storage = test_ndarray();
        assert_eq!(storage.shape(), (2, 3));
        assert_eq!(storage.view(), arr2(&[[1., 2., 3.], [4., 5., 6.]]));
    }
}
