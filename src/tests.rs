use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use approx::assert_abs_diff_eq;
use lazy_static::lazy_static;
use maplit::hashset;
use ndarray::arr2;
use tempfile::NamedTempFile;

use crate::embeddings::Embeddings;
use crate::error::Error;
use crate::similarity::{Analogy, WordSimilarity};
use crate::storage::{NdArray, StorageView};
use crate::text::{read_text_file, ReadText, WriteText};
use crate::vocab::{normalize_word, SimpleVocab, Vocab};

lazy_static! {
    static ref EMBEDDINGS: Embeddings<SimpleVocab, NdArray> =
        read_text_file("testdata/analogy.txt").unwrap();
}

static ANALOGIES: &[([&str; 3], &str)] = &[
    (["man", "woman", "king"], "queen"),
    (["italy", "italian", "spain"], "spanish"),
    (["small", "smaller", "large"], "larger"),
    (["italy", "italian", "france"], "french"),
    (["man", "woman", "boy"], "girl"),
    (["king", "queen", "man"], "woman"),
];

#[test]
fn test_analogies() {
    for (query, answer) in ANALOGIES {
        let result = EMBEDDINGS
            .complete_analogy(query[0], query[1], query[2])
            .unwrap();
        assert_eq!(result.word(), *answer, "query: {:?}", query);
    }
}

#[test]
fn test_analogy_similarity() {
    let result = EMBEDDINGS.complete_analogy("man", "woman", "king").unwrap();
    assert_abs_diff_eq!(result.cosine_similarity(), 0.9948106611036267, epsilon = 1e-9);

    let result = EMBEDDINGS
        .complete_analogy("italy", "italian", "spain")
        .unwrap();
    assert_abs_diff_eq!(result.cosine_similarity(), 0.9967519073981793, epsilon = 1e-9);
}

#[test]
fn test_analogy_is_case_insensitive() {
    let result = EMBEDDINGS.complete_analogy("Man", "WOMAN", "King").unwrap();
    assert_eq!(result.word(), "queen");
}

#[test]
fn test_analogy_never_returns_query_words() {
    for (query, _) in ANALOGIES {
        let excluded: Vec<_> = query.iter().map(|w| normalize_word(w)).collect();
        for result in EMBEDDINGS.analogy(*query, EMBEDDINGS.len()).unwrap() {
            assert!(!excluded.iter().any(|w| w == result.word()));
        }
    }
}

#[test]
fn test_analogy_ranking() {
    let results = EMBEDDINGS.analogy(["man", "woman", "king"], 3).unwrap();
    let words: Vec<_> = results.iter().map(|r| r.word()).collect();
    assert_eq!(words, vec!["queen", "princess", "girl"]);

    // Every word except the three query words gets a score.
    let results = EMBEDDINGS
        .analogy(["man", "woman", "king"], EMBEDDINGS.len())
        .unwrap();
    assert_eq!(results.len(), EMBEDDINGS.len() - 3);
}

#[test]
fn test_analogy_is_deterministic() {
    let first = EMBEDDINGS
        .analogy(["small", "smaller", "large"], 10)
        .unwrap();
    for _ in 0..5 {
        let again = EMBEDDINGS
            .analogy(["small", "smaller", "large"], 10)
            .unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn test_analogy_absent() {
    for query in &[
        ["xyzzynotaword", "woman", "king"],
        ["man", "xyzzynotaword", "king"],
        ["man", "woman", "xyzzynotaword"],
    ] {
        match EMBEDDINGS.complete_analogy(query[0], query[1], query[2]) {
            Err(Error::WordNotFound(word)) => assert_eq!(word, "xyzzynotaword"),
            other => panic!("Expected missing word, got: {:?}", other),
        }
    }
}

#[test]
fn test_analogy_only_query_words() {
    let vocab =
        SimpleVocab::new(vec!["man".to_owned(), "woman".to_owned(), "king".to_owned()]).unwrap();
    let storage = NdArray::new(arr2(&[[1., -1.], [1., 1.], [2., -1.]]));
    let embeddings = Embeddings::new(vocab, storage);
    assert!(matches!(
        embeddings.complete_analogy("man", "woman", "king"),
        Err(Error::NoEligibleCandidate)
    ));
}

#[test]
fn test_word_similarity() {
    let results = EMBEDDINGS.word_similarity("king", 3).unwrap();
    let words: Vec<_> = results.iter().map(|r| r.word()).collect();
    assert_eq!(words, vec!["prince", "man", "boy"]);

    let results = EMBEDDINGS.word_similarity("spain", 3).unwrap();
    let words: HashSet<_> = results.iter().map(|r| r.word()).collect();
    assert_eq!(words, hashset! {"france", "spanish", "italy"});
}

#[test]
fn test_write_read_through_file() {
    let file = NamedTempFile::new().unwrap();
    {
        let mut writer = BufWriter::new(file.reopen().unwrap());
        EMBEDDINGS.write_text(&mut writer).unwrap();
        writer.flush().unwrap();
    }

    let mut reader = BufReader::new(File::open(file.path()).unwrap());
    let embeddings = Embeddings::read_text(&mut reader).unwrap();
    assert_eq!(embeddings.vocab().words(), EMBEDDINGS.vocab().words());
    assert_eq!(embeddings.storage().view(), EMBEDDINGS.storage().view());

    let result = embeddings.complete_analogy("man", "woman", "king").unwrap();
    assert_eq!(result.word(), "queen");
}
