//! A library for analogy queries over word embeddings.
//!
//! embedding-analogy reads word embeddings in the GloVe and word2vec
//! text formats and answers analogy queries of the form *a is to b as
//! c is to ?*. Candidates are scored by the cosine similarity of their
//! offset from *c* to the offset of *b* from *a*.
//!
//! ```
//! use embedding_analogy::prelude::*;
//!
//! let embeddings = read_text_file("testdata/analogy.txt").unwrap();
//! let answer = embeddings.complete_analogy("man", "woman", "king").unwrap();
//! assert_eq!(answer.word(), "queen");
//! ```

pub mod embeddings;

pub mod error;

pub mod prelude;

pub mod similarity;

pub mod storage;

pub mod text;

pub(crate) mod util;

pub mod vocab;

#[cfg(test)]
mod tests;
