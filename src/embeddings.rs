//! Word embeddings.

use ndarray::{CowArray, Ix1};

use crate::storage::Storage;
use crate::vocab::{SortedWords, Vocab};

/// Word embeddings.
///
/// This data structure stores word embeddings (also known as *word
/// vectors*) and provides lookups of embeddings by word. Similarity
/// and analogy queries are provided by the traits in the
/// `similarity` module.
///
/// Embeddings are immutable after construction.
#[derive(Clone, Debug)]
pub struct Embeddings<V, S> {
    storage: S,
    vocab: V,
}

impl<V, S> Embeddings<V, S>
where
    V: Vocab,
    S: Storage,
{
    /// Construct embeddings from a vocabulary and storage.
    ///
    /// Panics when the number of words in the vocabulary differs from
    /// the number of rows in the storage.
    pub fn new(vocab: V, storage: S) -> Self {
        assert_eq!(
            vocab.words_len(),
            storage.shape().0,
            "Vocab and storage sizes differ."
        );

        Embeddings { vocab, storage }
    }

    /// Decompose embeddings in their vocabulary and storage.
    pub fn into_parts(self) -> (V, S) {
        (self.vocab, self.storage)
    }

    /// Return the length (in vector components) of the word embeddings.
    pub fn dims(&self) -> usize {
        self.storage.shape().1
    }

    /// Get the embedding of a word.
    ///
    /// The word is normalized before lookup.
    pub fn embedding(&self, word: &str) -> Option<CowArray<f64, Ix1>> {
        self.vocab.idx(word).map(|idx| self.storage.embedding(idx))
    }

    /// Return `true` if there are no embeddings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get an iterator over pairs of words and the corresponding embeddings.
    ///
    /// Embeddings are enumerated in lexicographic order of the words.
    pub fn iter(&self) -> Iter<S> {
        Iter {
            storage: &self.storage,
            inner: self.vocab.iter_sorted(),
        }
    }

    /// Return the number of words in the vocabulary.
    pub fn len(&self) -> usize {
        self.vocab.words_len()
    }

    /// Get the embedding storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Get the vocabulary.
    pub fn vocab(&self) -> &V {
        &self.vocab
    }
}

impl<'a, V, S> IntoIterator for &'a Embeddings<V, S>
where
    V: Vocab,
    S: Storage,
{
    type Item = (&'a str, CowArray<'a, f64, Ix1>);
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over embeddings.
pub struct Iter<'a, S> {
    storage: &'a S,
    inner: SortedWords<'a>,
}

impl<'a, S> Iterator for Iter<'a, S>
where
    S: Storage,
{
    type Item = (&'a str, CowArray<'a, f64, Ix1>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(word, idx)| (word, self.storage.embedding(idx)))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, arr2};

    use super::Embeddings;
    use crate::storage::NdArray;
    use crate::vocab::SimpleVocab;

    fn test_embeddings() -> Embeddings<SimpleVocab, NdArray> {
        let vocab = SimpleVocab::new(vec![
            "zebra".to_owned(),
            "Apple".to_owned(),
            "mango".to_owned(),
        ])
        .unwrap();
        let storage = NdArray::new(arr2(&[[1., 0.], [0., 1.], [1., 1.]]));
        Embeddings::new(vocab, storage)
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let embeddings = test_embeddings();
        assert_eq!(embeddings.embedding("APPLE").unwrap(), arr1(&[0., 1.]));
        assert_eq!(embeddings.embedding("zebra").unwrap(), arr1(&[1., 0.]));
        assert!(embeddings.embedding("pear").is_none());
    }

    #[test]
    fn size_and_dims() {
        let embeddings = test_embeddings();
        assert_eq!(embeddings.len(), 3);
        assert_eq!(embeddings.dims(), 2);
        assert!(!embeddings.is_empty());
    }

    #[test]
    fn iteration_is_lexicographic() {
        let embeddings = test_embeddings();
        let words: Vec<_> = embeddings.iter().map(|(word, _)| word).collect();
        assert_eq!(words, vec!["apple", "mango", "zebra"]);

        let (word, embedding) = (&embeddings).into_iter().last().unwrap();
        assert_eq!(word, "zebra");
        assert_eq!(embedding, arr1(&[1., 0.]));
    }

    #[test]
    #[should_panic]
    fn mismatching_sizes_panic() {
        let vocab = SimpleVocab::new(vec!["one".to_owned()]).unwrap();
        let storage = NdArray::new(arr2(&[[1., 0.], [0., 1.]]));
        Embeddings::new(vocab, storage);
    }
}
