//! Traits and trait implementations for similarity queries.
//!
//! Similarities are computed on the embeddings as they were read. The
//! norms of the embeddings are not cached, every query computes the
//! norms it needs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f64;

use log::trace;
use ndarray::{Array1, ArrayView1, CowArray, Ix1};
use ordered_float::NotNan;

use crate::embeddings::Embeddings;
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::util::{l2_norm, max_abs};
use crate::vocab::Vocab;

/// Compute the cosine similarity of two vectors.
///
/// The cosine similarity is the dot product of `u` and `v` divided by
/// the product of their l2 norms, which lies in *[-1, 1]*.
///
/// Returns `Error::DimensionMismatch` when the vectors have different
/// lengths and `Error::UndefinedSimilarity` when either vector has a
/// norm of zero. A zero norm is always reported as an error, never as
/// a sentinel similarity.
pub fn cosine_similarity(u: ArrayView1<f64>, v: ArrayView1<f64>) -> Result<f64> {
    if u.len() != v.len() {
        return Err(Error::DimensionMismatch {
            expected: u.len(),
            got: v.len(),
        });
    }

    let (u_scale, v_scale) = (max_abs(u), max_abs(v));
    if u_scale == 0. || v_scale == 0. {
        return Err(Error::UndefinedSimilarity);
    }

    // Largest component 1, so the dot products neither overflow nor
    // underflow to zero.
    let u = &u / u_scale;
    let v = &v / v_scale;
    let similarity = u.dot(&v) / (u.dot(&u).sqrt() * v.dot(&v).sqrt());
    if similarity.is_nan() {
        return Err(Error::UndefinedSimilarity);
    }

    // Rounding can push the quotient slightly outside [-1, 1].
    Ok(similarity.max(-1.).min(1.))
}

/// A word with its similarity.
///
/// This data structure is used to store a pair consisting of a word and
/// its similarity to a query.
#[derive(Debug, Eq, PartialEq)]
pub struct WordSimilarityResult<'a> {
    similarity: NotNan<f64>,
    word: &'a str,
}

impl<'a> WordSimilarityResult<'a> {
    /// Get the word's similarity in angular similarity.
    pub fn angular_similarity(&self) -> f64 {
        1f64 - (self.similarity.acos() / f64::consts::PI)
    }

    /// Get the word's similarity in cosine similarity.
    pub fn cosine_similarity(&self) -> f64 {
        *self.similarity
    }

    /// Get the word.
    pub fn word(&self) -> &'a str {
        self.word
    }
}

impl<'a> Ord for WordSimilarityResult<'a> {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.similarity.cmp(&self.similarity) {
            Ordering::Equal => self.word.cmp(other.word),
            ordering => ordering,
        }
    }
}

impl<'a> PartialOrd for WordSimilarityResult<'a> {
    fn partial_cmp(&self, other: &WordSimilarityResult) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Trait for analogy queries.
///
/// An analogy query *a is to b as c is to ?* is answered by the word *d*
/// whose offset from *c* points in the same direction as the offset of
/// *b* from *a*. More concretely, candidates are scored by:
///
/// *cos(embedding(b) - embedding(a), embedding(d) - embedding(c))*
///
/// Query words are normalized before lookup. The vocabulary is scanned
/// in lexicographic order, ties between candidates with the same
/// similarity are resolved in favor of the lexicographically smallest
/// word.
pub trait Analogy {
    /// Complete the analogy `a` is to `b` as `c` is to `?`.
    ///
    /// Returns the best-scoring word other than `a`, `b`, and `c`.
    ///
    /// Fails with `Error::WordNotFound` when one of the query words is
    /// not in the vocabulary, `Error::UndefinedSimilarity` when `a` and
    /// `b` have the same embedding, and `Error::NoEligibleCandidate`
    /// when no other word could be scored.
    fn complete_analogy(&self, a: &str, b: &str, c: &str) -> Result<WordSimilarityResult>;

    /// Perform an analogy query.
    ///
    /// This method returns at most `limit` words, ordered by decreasing
    /// similarity. The query words are never returned. The first result
    /// is the answer of `complete_analogy`.
    fn analogy(&self, query: [&str; 3], limit: usize) -> Result<Vec<WordSimilarityResult>> {
        self.analogy_masked(query, [true, true, true], limit)
    }

    /// Perform an analogy query.
    ///
    /// This method returns at most `limit` words, ordered by decreasing
    /// similarity.
    ///
    /// `remove` specifies which parts of the queries are excluded from the
    /// output candidates. If `remove[0]` is `true`, `query[0]` cannot be
    /// returned as an answer to the query.
    fn analogy_masked(
        &self,
        query: [&str; 3],
        remove: [bool; 3],
        limit: usize,
    ) -> Result<Vec<WordSimilarityResult>>;
}

impl<V, S> Analogy for Embeddings<V, S>
where
    V: Vocab,
    S: Storage,
{
    fn complete_analogy(&self, a: &str, b: &str, c: &str) -> Result<WordSimilarityResult> {
        // Below any attainable cosine similarity.
        let mut best_similarity = f64::NEG_INFINITY;
        let mut best = None;

        for candidate in analogy_candidates(self, [a, b, c], [true, true, true])? {
            // Strictly greater, so that the earliest candidate wins a tie.
            if candidate.cosine_similarity() > best_similarity {
                best_similarity = candidate.cosine_similarity();
                best = Some(candidate);
            }
        }

        best.ok_or(Error::NoEligibleCandidate)
    }

    fn analogy_masked(
        &self,
        query: [&str; 3],
        remove: [bool; 3],
        limit: usize,
    ) -> Result<Vec<WordSimilarityResult>> {
        let candidates = analogy_candidates(self, query, remove)?;
        top_k(candidates, limit)
    }
}

/// Trait for word similarity queries.
pub trait WordSimilarity {
    /// Find words that are similar to the query word.
    ///
    /// The similarity between two words is the cosine similarity of
    /// their embeddings. At most, `limit` results are returned, ordered
    /// by decreasing similarity. The query word itself is never
    /// returned.
    fn word_similarity(&self, word: &str, limit: usize) -> Result<Vec<WordSimilarityResult>>;
}

impl<V, S> WordSimilarity for Embeddings<V, S>
where
    V: Vocab,
    S: Storage,
{
    fn word_similarity(&self, word: &str, limit: usize) -> Result<Vec<WordSimilarityResult>> {
        let idx = self
            .vocab()
            .idx(word)
            .ok_or_else(|| Error::WordNotFound(word.to_owned()))?;
        let query = self.storage().embedding(idx).into_owned();
        if l2_norm(query.view()) == 0. {
            return Err(Error::UndefinedSimilarity);
        }

        let candidates = self
            .vocab()
            .iter_sorted()
            .filter(move |&(_, candidate_idx)| candidate_idx != idx)
            .filter_map(move |(word, candidate_idx)| {
                let embedding = self.storage().embedding(candidate_idx);
                score(word, query.view(), embedding.view())
            });

        top_k(candidates, limit)
    }
}

/// Score all candidates for an analogy query.
///
/// Candidates are produced in the enumeration order of the vocabulary.
/// Candidates for which the similarity is undefined are skipped.
fn analogy_candidates<'a, V, S>(
    embeddings: &'a Embeddings<V, S>,
    query: [&str; 3],
    remove: [bool; 3],
) -> Result<impl Iterator<Item = WordSimilarityResult<'a>> + 'a>
where
    V: Vocab,
    S: Storage,
{
    let [(idx1, embedding1), (idx2, embedding2), (idx3, embedding3)] =
        lookup_words3(embeddings, query)?;

    let direction = &embedding2.view() - &embedding1.view();
    if l2_norm(direction.view()) == 0. {
        return Err(Error::UndefinedSimilarity);
    }

    let origin: Array1<f64> = embedding3.into_owned();

    let skip: Vec<usize> = [idx1, idx2, idx3]
        .iter()
        .zip(remove.iter())
        .filter(|(_, &exclude)| exclude)
        .map(|(&idx, _)| idx)
        .collect();

    Ok(embeddings
        .vocab()
        .iter_sorted()
        .filter(move |(_, idx)| !skip.contains(idx))
        .filter_map(move |(word, idx)| {
            let embedding = embeddings.storage().embedding(idx);
            let offset = &embedding.view() - &origin.view();
            score(word, direction.view(), offset.view())
        }))
}

fn score<'a>(
    word: &'a str,
    query: ArrayView1<f64>,
    candidate: ArrayView1<f64>,
) -> Option<WordSimilarityResult<'a>> {
    let similarity = cosine_similarity(query, candidate).ok()?;
    Some(WordSimilarityResult {
        word,
        similarity: NotNan::new(similarity).ok()?,
    })
}

/// Retain the `limit` best candidates, best first.
fn top_k<'a>(
    candidates: impl Iterator<Item = WordSimilarityResult<'a>>,
    limit: usize,
) -> Result<Vec<WordSimilarityResult<'a>>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut results = BinaryHeap::with_capacity(limit);
    let mut n_scored = 0;

    for word_similarity in candidates {
        n_scored += 1;

        if results.len() < limit {
            results.push(word_similarity);
        } else if let Some(mut peek) = results.peek_mut() {
            if word_similarity < *peek {
                *peek = word_similarity
            }
        }
    }

    trace!("Scored {} candidates", n_scored);

    if results.is_empty() {
        return Err(Error::NoEligibleCandidate);
    }

    Ok(results.into_sorted_vec())
}

fn lookup_words3<'a, V, S>(
    embeddings: &'a Embeddings<V, S>,
    query: [&str; 3],
) -> Result<[(usize, CowArray<'a, f64, Ix1>); 3]>
where
    V: Vocab,
    S: Storage,
{
    let lookup = |word: &str| {
        embeddings
            .vocab()
            .idx(word)
            .map(|idx| (idx, embeddings.storage().embedding(idx)))
            .ok_or_else(|| Error::WordNotFound(word.to_owned()))
    };

    Ok([lookup(query[0])?, lookup(query[1])?, lookup(query[2])?])
}
