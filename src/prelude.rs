//! Prelude exports the most commonly-used types and traits.

pub use crate::embeddings::Embeddings;

pub use crate::similarity::{Analogy, WordSimilarity, WordSimilarityResult};

pub use crate::storage::{NdArray, Storage, StorageView};

pub use crate::text::{read_text_file, ReadText, ReadTextDims, WriteText, WriteTextDims};

pub use crate::vocab::{SimpleVocab, Vocab};
