use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{anyhow, bail, Context, Error};
use embedding_analogy::prelude::*;
use embedding_analogy::vocab::normalize_word;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbeddingFormat {
    Text,
    TextDims,
}

impl EmbeddingFormat {
    pub fn try_from(format: impl AsRef<str>) -> Result<Self, Error> {
        use EmbeddingFormat::*;

        match format.as_ref() {
            "text" => Ok(Text),
            "textdims" => Ok(TextDims),
            unknown => Err(anyhow!("Unknown embedding format: {}", unknown)),
        }
    }
}

pub fn read_embeddings(
    filename: &str,
    embedding_format: EmbeddingFormat,
) -> Result<Embeddings<SimpleVocab, NdArray>, Error> {
    let f = File::open(filename).context("Cannot open embeddings file")?;
    let mut reader = BufReader::new(f);

    use EmbeddingFormat::*;
    let embeddings: Embeddings<SimpleVocab, NdArray> = match embedding_format {
        Text => ReadText::read_text(&mut reader),
        TextDims => ReadTextDims::read_text_dims(&mut reader),
    }
    .context("Cannot read embeddings")?;

    log::info!(
        "Loaded {} embeddings with {} components from {}",
        embeddings.len(),
        embeddings.dims(),
        filename
    );

    Ok(embeddings)
}

/// Parse an analogy query consisting of three whitespace-separated words.
pub fn parse_query(line: &str) -> Result<[&str; 3], Error> {
    let words: Vec<_> = line.split_whitespace().collect();
    match words.as_slice() {
        &[a, b, c] => Ok([a, b, c]),
        _ => bail!("Expected exactly 3 words, but got {}", words.len()),
    }
}

/// An analogy question with its expected answer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instance {
    pub section: String,
    pub query: [String; 3],
    pub answer: String,
}

/// Read analogy questions.
///
/// Questions are in the format of word2vec's `questions-words.txt`:
/// a line `: section` starts a section, every other non-empty line
/// contains four words *a b c d*, where *d* is the expected answer.
pub fn read_analogies(reader: impl BufRead) -> Result<Vec<Instance>, Error> {
    let mut section = String::new();

    let mut instances = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Cannot read line")?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix(':') {
            section = name.trim().to_owned();
            continue;
        }

        let quadruple: Vec<_> = line.split_whitespace().collect();
        if quadruple.len() != 4 {
            bail!(
                "Line {}: expected 4 words, got {}",
                line_no + 1,
                quadruple.len()
            );
        }

        instances.push(Instance {
            section: section.clone(),
            query: [
                quadruple[0].to_owned(),
                quadruple[1].to_owned(),
                quadruple[2].to_owned(),
            ],
            answer: quadruple[3].to_owned(),
        });
    }

    Ok(instances)
}

/// Evaluation counts of a section.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counts {
    pub n_correct: usize,
    pub n_instances: usize,
    pub n_skipped: usize,
}

impl Counts {
    /// Accuracy in percent, `None` without evaluated instances.
    pub fn accuracy(&self) -> Option<f64> {
        if self.n_instances == 0 {
            return None;
        }

        Some((self.n_correct as f64 / self.n_instances as f64) * 100.)
    }
}

/// Evaluate analogy questions.
///
/// Questions of which the answer is not in the vocabulary are skipped.
/// This is a shortcoming of the vocabulary and not of the embeddings.
/// Questions for which no answer can be computed are counted as
/// incorrect.
pub fn eval_analogies<V, S>(
    embeddings: &Embeddings<V, S>,
    instances: &[Instance],
) -> BTreeMap<String, Counts>
where
    V: Vocab,
    S: Storage,
{
    let mut section_counts: BTreeMap<String, Counts> = BTreeMap::new();

    for instance in instances {
        let counts = section_counts.entry(instance.section.clone()).or_default();

        if embeddings.vocab().idx(&instance.answer).is_none() {
            counts.n_skipped += 1;
            continue;
        }

        let [a, b, c] = &instance.query;
        let is_correct = match embeddings.complete_analogy(a, b, c) {
            Ok(result) => result.word() == normalize_word(&instance.answer),
            Err(err) => {
                log::debug!("{} {} {}: {}", a, b, c, err);
                false
            }
        };

        counts.n_instances += 1;
        if is_correct {
            counts.n_correct += 1;
        }
    }

    section_counts
}
