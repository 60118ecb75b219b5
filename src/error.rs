//! Error types for reading embeddings and answering queries.

use std::io;

use ndarray::ShapeError;
use thiserror::Error;

/// `Result` type alias for operations that can fail.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Errors in reading embeddings or answering similarity queries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A query word is not in the vocabulary.
    #[error("Word is not in the vocabulary: {0}")]
    WordNotFound(String),

    /// Cosine similarity involving a zero-norm vector.
    #[error("Cosine similarity is undefined for vectors with a zero norm")]
    UndefinedSimilarity,

    /// No candidate remained after excluding the query words.
    #[error("No eligible candidate remains after excluding the query words")]
    NoEligibleCandidate,

    /// Two vectors of different lengths were compared.
    #[error("Vector dimensionality mismatch, expected: {expected}, got: {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid file format.
    #[error("Invalid file format: {0}")]
    Format(String),

    /// I/O error while reading.
    #[error("{desc}: {error}")]
    Read { desc: String, error: io::Error },

    /// I/O error while writing.
    #[error("{desc}: {error}")]
    Write { desc: String, error: io::Error },

    /// `ndarray` shape error.
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl Error {
    pub fn read_error(desc: impl Into<String>, error: io::Error) -> Self {
        Error::Read {
            desc: desc.into(),
            error,
        }
    }

    pub fn write_error(desc: impl Into<String>, error: io::Error) -> Self {
        Error::Write {
            desc: desc.into(),
            error,
        }
    }
}
