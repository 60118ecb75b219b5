//! Readers and writers for text formats.
//!
//! This module provides two readers/writers:
//!
//! 1. `ReadText`/`WriteText`: word embeddings in text format. In this
//!    format, each line contains a word followed by its
//!    embedding. The word and the embedding vector components are
//!    separated by a space. This format is used by GloVe.
//! 2. `ReadTextDims`/`WriteTextDims`: this format is the same as (1),
//!    but the data is preceded by a line with the shape of the
//!    embedding matrix. This format is used by word2vec's text
//!    output.
//!
//! For example:
//!
//! ```
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use embedding_analogy::prelude::*;
//!
//! let mut reader = BufReader::new(File::open("testdata/analogy.dims").unwrap());
//!
//! let embeddings = Embeddings::read_text_dims(&mut reader).unwrap();
//!
//! // Look up an embedding.
//! let embedding = embeddings.embedding("Queen");
//! assert!(embedding.is_some());
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use itertools::Itertools;
use log::debug;
use ndarray::Array2;

use crate::embeddings::Embeddings;
use crate::error::{Error, Result};
use crate::storage::{NdArray, Storage};
use crate::util::read_number;
use crate::vocab::{SimpleVocab, Vocab};

/// Method to construct `Embeddings` from a text file.
///
/// This trait defines an extension to `Embeddings` to read the word embeddings
/// from a text stream. The text should contain one word embedding per line in
/// the following format:
///
/// *word0 component_1 component_2 ... component_n*
pub trait ReadText<R>
where
    Self: Sized,
    R: BufRead,
{
    /// Read the embeddings from the given buffered reader.
    fn read_text(reader: &mut R) -> Result<Self>;

    /// Read the embeddings from the given buffered reader.
    ///
    /// In contrast to `read_text`, this constructor does not
    /// fail if a token contains invalid UTF-8. Instead, it will
    /// replace invalid UTF-8 characters by the replacement
    /// character.
    fn read_text_lossy(reader: &mut R) -> Result<Self>;
}

impl<R> ReadText<R> for Embeddings<SimpleVocab, NdArray>
where
    R: BufRead,
{
    fn read_text(reader: &mut R) -> Result<Self> {
        read_embeds(reader, None, false)
    }

    fn read_text_lossy(reader: &mut R) -> Result<Self> {
        read_embeds(reader, None, true)
    }
}

/// Method to construct `Embeddings` from a text file with dimensions.
///
/// This trait defines an extension to `Embeddings` to read the word embeddings
/// from a text stream. The text must contain as the first line the shape of
/// the embedding matrix:
///
/// *vocab_size n_components*
///
/// The remainder of the stream should contain one word embedding per line in
/// the following format:
///
/// *word0 component_1 component_2 ... component_n*
pub trait ReadTextDims<R>
where
    Self: Sized,
    R: BufRead,
{
    /// Read the embeddings from the given buffered reader.
    fn read_text_dims(reader: &mut R) -> Result<Self>;

    /// Read the embeddings from the given buffered reader.
    ///
    /// In contrast to `read_text_dims`, this constructor does not
    /// fail if a token contains invalid UTF-8. Instead, it will
    /// replace invalid UTF-8 characters by the replacement
    /// character.
    fn read_text_dims_lossy(reader: &mut R) -> Result<Self>;
}

impl<R> ReadTextDims<R> for Embeddings<SimpleVocab, NdArray>
where
    R: BufRead,
{
    fn read_text_dims(reader: &mut R) -> Result<Self> {
        let n_words = read_number(reader, b' ')?;
        let embed_len = read_number(reader, b'\n')?;

        read_embeds(reader, Some((n_words, embed_len)), false)
    }

    fn read_text_dims_lossy(reader: &mut R) -> Result<Self> {
        let n_words = read_number(reader, b' ')?;
        let embed_len = read_number(reader, b'\n')?;

        read_embeds(reader, Some((n_words, embed_len)), true)
    }
}

/// Read embeddings in GloVe text format from a file.
pub fn read_text_file(path: impl AsRef<Path>) -> Result<Embeddings<SimpleVocab, NdArray>> {
    let f = File::open(path.as_ref())
        .map_err(|e| Error::read_error("Cannot open embeddings file", e))?;
    Embeddings::read_text(&mut BufReader::new(f))
}

const MAX_PREALLOC_WORDS: usize = 1 << 16;

const MAX_PREALLOC_COMPONENTS: usize = 1 << 22;

fn read_embeds<R>(
    reader: &mut R,
    shape: Option<(usize, usize)>,
    lossy: bool,
) -> Result<Embeddings<SimpleVocab, NdArray>>
where
    R: BufRead,
{
    let (mut words, mut data) = if let Some((n_words, dims)) = shape {
        let n_components = n_words.checked_mul(dims).ok_or_else(|| {
            Error::Format(format!(
                "Embedding matrix shape is too large: {} x {}",
                n_words, dims
            ))
        })?;

        // The header is not trusted, larger matrices grow while reading.
        (
            Vec::with_capacity(n_words.min(MAX_PREALLOC_WORDS)),
            Vec::with_capacity(n_components.min(MAX_PREALLOC_COMPONENTS)),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    let mut dims = shape.map(|(_, dims)| dims);

    loop {
        let mut buf = Vec::new();
        match reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| Error::read_error("Cannot read line from embedding file", e))?
        {
            0 => break,
            n => {
                if buf[n - 1] == b'\n' {
                    buf.pop();
                }
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
        };

        let line = if lossy {
            String::from_utf8_lossy(&buf).into_owned()
        } else {
            String::from_utf8(buf)
                .map_err(|e| Error::Format(format!("Token contains invalid UTF-8: {}", e)))?
        };

        let mut parts = line
            .split(|c: char| c.is_ascii_whitespace())
            .filter(|part| !part.is_empty());

        let word = parts
            .next()
            .ok_or_else(|| Error::Format(String::from("Spurious empty line")))?;

        let start = data.len();
        for part in parts {
            let component: f64 = part.parse().map_err(|e| {
                Error::Format(format!("Cannot parse vector component '{}': {}", part, e))
            })?;
            if !component.is_finite() {
                return Err(Error::Format(format!(
                    "Vector component of '{}' is not finite: {}",
                    word, part
                )));
            }
            data.push(component);
        }
        let n_components = data.len() - start;

        match dims {
            Some(dims) if n_components != dims => {
                return Err(Error::Format(format!(
                    "Incorrect embedding dimensionality for '{}', expected: {}, got: {}",
                    word, dims, n_components
                )))
            }
            Some(_) => (),
            None if n_components == 0 => {
                return Err(Error::Format(format!(
                    "Embedding of '{}' has no components",
                    word
                )))
            }
            None => dims = Some(n_components),
        }

        words.push(word.to_owned());
    }

    let dims = match dims {
        Some(0) => return Err(Error::Format(String::from("Embeddings have no components"))),
        Some(dims) if !words.is_empty() => dims,
        _ => return Err(Error::Format(String::from("No word embeddings found"))),
    };

    if let Some((n_words, _)) = shape {
        if words.len() != n_words {
            return Err(Error::Format(format!(
                "Incorrect vocabulary size, expected: {}, got: {}",
                n_words,
                words.len()
            )));
        }
    }

    let matrix = Array2::from_shape_vec((words.len(), dims), data)?;
    let vocab = SimpleVocab::new(words)?;

    debug!(
        "Read {} word embeddings with {} components",
        vocab.words_len(),
        dims
    );

    Ok(Embeddings::new(vocab, NdArray::new(matrix)))
}

/// Method to write `Embeddings` to a text file.
///
/// This trait defines an extension to `Embeddings` to write the word embeddings
/// as text. The text will contain one word embedding per line in the following
/// format:
///
/// *word0 component_1 component_2 ... component_n*
///
/// Embeddings are written in vocabulary index order.
pub trait WriteText<W>
where
    W: Write,
{
    /// Write the embeddings to the given writer.
    fn write_text(&self, writer: &mut W) -> Result<()>;
}

impl<W, V, S> WriteText<W> for Embeddings<V, S>
where
    W: Write,
    V: Vocab,
    S: Storage,
{
    fn write_text(&self, write: &mut W) -> Result<()> {
        for (idx, word) in self.vocab().words().iter().enumerate() {
            let embed = self.storage().embedding(idx);
            let embed_str = embed.view().iter().map(ToString::to_string).join(" ");
            writeln!(write, "{} {}", word, embed_str)
                .map_err(|e| Error::write_error("Cannot write word embedding", e))?;
        }

        Ok(())
    }
}

/// Method to write `Embeddings` to a text file.
///
/// This trait defines an extension to `Embeddings` to write the word embeddings
/// as text. The text will contain one word embedding per line in the following
/// format:
///
/// *word0 component_1 component_2 ... component_n*
pub trait WriteTextDims<W>
where
    W: Write,
{
    /// Write the embeddings to the given writer.
    fn write_text_dims(&self, writer: &mut W) -> Result<()>;
}

impl<W, V, S> WriteTextDims<W> for Embeddings<V, S>
where
    W: Write,
    V: Vocab,
    S: Storage,
{
    fn write_text_dims(&self, write: &mut W) -> Result<()> {
        writeln!(write, "{} {}", self.vocab().words_len(), self.dims())
            .map_err(|e| Error::write_error("Cannot write word embedding matrix shape", e))?;
        self.write_text(write)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};

    use ndarray::arr1;

    use super::{read_text_file, ReadText, ReadTextDims, WriteText, WriteTextDims};
    use crate::embeddings::Embeddings;
    use crate::error::Error;
    use crate::storage::StorageView;
    use crate::vocab::Vocab;

    fn read_err(text: &str) -> Error {
        Embeddings::read_text(&mut Cursor::new(text)).unwrap_err()
    }

    #[test]
    fn read_text() {
        let f = File::open("testdata/analogy.txt").unwrap();
        let mut reader = BufReader::new(f);
        let embeddings = Embeddings::read_text(&mut reader).unwrap();
        assert_eq!(embeddings.len(), 23);
        assert_eq!(embeddings.dims(), 12);
        assert_eq!(&embeddings.vocab().words()[..3], &["man", "woman", "king"]);
    }

    #[test]
    fn read_text_dims() {
        let f = File::open("testdata/analogy.dims").unwrap();
        let mut reader = BufReader::new(f);
        let dims_embeddings = Embeddings::read_text_dims(&mut reader).unwrap();

        let embeddings = read_text_file("testdata/analogy.txt").unwrap();
        assert_eq!(dims_embeddings.vocab().words(), embeddings.vocab().words());
        assert_eq!(
            dims_embeddings.storage().view(),
            embeddings.storage().view()
        );
    }

    #[test]
    fn read_text_keeps_raw_values() {
        let embeddings =
            Embeddings::read_text(&mut Cursor::new("Berlin 3 4\r\nparis\t0.5 -1e2\n")).unwrap();
        assert_eq!(embeddings.embedding("berlin").unwrap(), arr1(&[3., 4.]));
        assert_eq!(embeddings.embedding("Paris").unwrap(), arr1(&[0.5, -100.]));
        assert_eq!(embeddings.vocab().words(), &["berlin", "paris"]);
    }

    #[test]
    fn fails_on_invalid_utf8() {
        let mut reader = Cursor::new(b"meren 1 2\nzee\xc3n 3 4\n".to_vec());
        assert!(matches!(
            Embeddings::read_text(&mut reader),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn read_lossy() {
        let mut reader = Cursor::new(b"meren 1 2\nzee\xc3n 3 4\nrivieren 5 6\n".to_vec());
        let embeddings = Embeddings::read_text_lossy(&mut reader).unwrap();
        assert_eq!(
            embeddings.vocab().words(),
            &["meren", "zee\u{fffd}n", "rivieren"]
        );
    }

    #[test]
    fn fails_on_malformed_lines() {
        assert!(matches!(read_err("a 1 2\n\nb 3 4\n"), Error::Format(_)));
        assert!(matches!(read_err("a 1 2\nb 3 x\n"), Error::Format(_)));
        assert!(matches!(read_err("a 1 2\nb 3 4 5\n"), Error::Format(_)));
        assert!(matches!(read_err("a\nb\n"), Error::Format(_)));
        assert!(matches!(read_err("a 1 NaN\n"), Error::Format(_)));
        assert!(matches!(read_err("a 1 inf\n"), Error::Format(_)));
        assert!(matches!(read_err(""), Error::Format(_)));
    }

    #[test]
    fn fails_on_duplicate_words() {
        assert!(matches!(read_err("King 1 2\nking 3 4\n"), Error::Format(_)));
    }

    #[test]
    fn fails_on_incorrect_shape() {
        let mut reader = Cursor::new("3 2\na 1 2\nb 3 4\n");
        assert!(matches!(
            Embeddings::read_text_dims(&mut reader),
            Err(Error::Format(_))
        ));

        let mut reader = Cursor::new("2 3\na 1 2\nb 3 4\n");
        assert!(matches!(
            Embeddings::read_text_dims(&mut reader),
            Err(Error::Format(_))
        ));

        let mut reader = Cursor::new("two 2\na 1 2\nb 3 4\n");
        assert!(Embeddings::read_text_dims(&mut reader).is_err());

        let mut reader = Cursor::new("2 0\na\nb\n");
        assert!(matches!(
            Embeddings::read_text_dims(&mut reader),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn fails_on_oversized_header() {
        let mut reader = Cursor::new("99999999999 99999999999\na 1 2\n");
        assert!(matches!(
            Embeddings::read_text_dims(&mut reader),
            Err(Error::Format(_))
        ));

        let mut reader = Cursor::new("4294967296 4294967296\na 1 2\n");
        assert!(matches!(
            Embeddings::read_text_dims(&mut reader),
            Err(Error::Format(_))
        ));

        let mut reader = Cursor::new("100000000 100000000\na 1 2\n");
        assert!(matches!(
            Embeddings::read_text_dims(&mut reader),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        assert!(matches!(
            read_text_file("testdata/does-not-exist.txt"),
            Err(Error::Read { .. })
        ));
    }

    #[test]
    fn text_roundtrip() {
        let mut reader = BufReader::new(File::open("testdata/analogy.txt").unwrap());
        let mut check = String::new();
        reader.read_to_string(&mut check).unwrap();

        reader.seek(SeekFrom::Start(0)).unwrap();
        let embeddings = Embeddings::read_text(&mut reader).unwrap();

        let mut output = Vec::new();
        embeddings.write_text(&mut output).unwrap();

        assert_eq!(check, String::from_utf8_lossy(&output));
    }

    #[test]
    fn text_dims_roundtrip() {
        let mut reader = BufReader::new(File::open("testdata/analogy.dims").unwrap());
        let mut check = String::new();
        reader.read_to_string(&mut check).unwrap();

        reader.seek(SeekFrom::Start(0)).unwrap();
        let embeddings = Embeddings::read_text_dims(&mut reader).unwrap();

        let mut output = Vec::new();
        embeddings.write_text_dims(&mut output).unwrap();

        assert_eq!(check, String::from_utf8_lossy(&output));
    }
}
