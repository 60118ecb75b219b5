//! Embedding vocabularies

use std::collections::btree_map::{self, BTreeMap, Entry};

use crate::error::{Error, Result};

/// Normalize a word to the key convention of vocabularies.
///
/// Vocabulary keys are lowercased, so that lookups are
/// case-insensitive.
pub fn normalize_word(word: &str) -> String {
    word.to_lowercase()
}

/// Embedding vocabularies.
#[allow(clippy::len_without_is_empty)]
pub trait Vocab {
    /// Get the index of a token.
    ///
    /// The token is normalized before lookup.
    fn idx(&self, word: &str) -> Option<usize>;

    /// Get the number of words in the vocabulary.
    fn words_len(&self) -> usize;

    /// Get the words in the vocabulary, in index order.
    fn words(&self) -> &[String];

    /// Get an iterator over words and their indices.
    ///
    /// Words are enumerated in lexicographic order of their normalized
    /// forms. Similarity queries scan the vocabulary in this order, so
    /// that ties are always resolved the same way.
    fn iter_sorted(&self) -> SortedWords;
}

/// Vocabulary without subword units.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimpleVocab {
    indices: BTreeMap<String, usize>,
    words: Vec<String>,
}

impl SimpleVocab {
    /// Construct a new simple vocabulary.
    ///
    /// Words are normalized and assigned indices in the given order.
    /// Returns an error when two words have the same normalized form.
    pub fn new(words: impl Into<Vec<String>>) -> Result<Self> {
        let words: Vec<String> = words
            .into()
            .iter()
            .map(|word| normalize_word(word))
            .collect();

        let mut indices = BTreeMap::new();
        for (idx, word) in words.iter().enumerate() {
            match indices.entry(word.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(idx);
                }
                Entry::Occupied(_) => {
                    return Err(Error::Format(format!(
                        "Duplicate word in vocabulary: {}",
                        word
                    )))
                }
            }
        }

        Ok(SimpleVocab { indices, words })
    }
}

impl Vocab for SimpleVocab {
    fn idx(&self, word: &str) -> Option<usize> {
        self.indices.get(&normalize_word(word)).cloned()
    }

    fn words_len(&self) -> usize {
        self.words.len()
    }

    fn words(&self) -> &[String] {
        &self.words
    }

    fn iter_sorted(&self) -> SortedWords {
        SortedWords {
            inner: self.indices.iter(),
        }
    }
}

/// Iterator over words in lexicographic order.
pub struct SortedWords<'a> {
    inner: btree_map::Iter<'a, String, usize>,
}

impl<'a> Iterator for SortedWords<'a> {
    type Item = (&'a str, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(word, &idx)| (word.as_str(), idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> ExactSizeIterator for SortedWords<'a> {}
