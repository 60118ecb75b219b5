use std::io::BufRead;

use clap::{App, AppSettings, Arg, ArgMatches};
use embedding_analogy::prelude::*;
use embedding_analogy_utils::{parse_query, read_embeddings, EmbeddingFormat};
use stdinout::{Input, OrExit};

static DEFAULT_CLAP_SETTINGS: &[AppSettings] = &[
    AppSettings::DontCollapseArgsInUsage,
    AppSettings::UnifiedHelpMessage,
];

// Option constants
static EMBEDDINGS: &str = "EMBEDDINGS";
static INPUT: &str = "INPUT";
static FORMAT: &str = "format";
static NEIGHBORS: &str = "neighbors";

fn parse_args() -> ArgMatches<'static> {
    App::new("ea-analogy")
        .settings(DEFAULT_CLAP_SETTINGS)
        .about("Complete analogies: a is to b as c is to ?")
        .arg(
            Arg::with_name(FORMAT)
                .short("f")
                .value_name("FORMAT")
                .help("Embedding format: text or textdims (default: text)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name(NEIGHBORS)
                .short("k")
                .value_name("K")
                .help("Return K answers (default: 1)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name(EMBEDDINGS)
                .help("Embeddings file")
                .index(1)
                .required(true),
        )
        .arg(
            Arg::with_name(INPUT)
                .help("Analogy queries, three words per line (default: stdin)")
                .index(2),
        )
        .get_matches()
}

struct Config {
    embeddings_filename: String,
    embedding_format: EmbeddingFormat,
    input_filename: Option<String>,
    k: usize,
}

fn config_from_matches(matches: &ArgMatches) -> Config {
    let embeddings_filename = matches.value_of(EMBEDDINGS).unwrap().to_owned();

    let embedding_format = matches
        .value_of(FORMAT)
        .map(|f| EmbeddingFormat::try_from(f).or_exit("Cannot parse embedding format", 1))
        .unwrap_or(EmbeddingFormat::Text);

    let input_filename = matches.value_of(INPUT).map(ToOwned::to_owned);

    let k = matches
        .value_of(NEIGHBORS)
        .map(|v| v.parse().or_exit("Cannot parse k", 1))
        .unwrap_or(1);

    Config {
        embeddings_filename,
        embedding_format,
        input_filename,
        k,
    }
}

fn answer(embeddings: &Embeddings<SimpleVocab, NdArray>, query: [&str; 3], k: usize) {
    if k == 1 {
        match embeddings.complete_analogy(query[0], query[1], query[2]) {
            Ok(result) => println!(
                "{} -> {} :: {} -> {}\t{}",
                query[0],
                query[1],
                query[2],
                result.word(),
                result.cosine_similarity()
            ),
            Err(err) => eprintln!("{}: {}", query.join(" "), err),
        }
        return;
    }

    match embeddings.analogy(query, k) {
        Ok(results) => {
            for result in results {
                println!("{}\t{}", result.word(), result.cosine_similarity());
            }
        }
        Err(err) => eprintln!("{}: {}", query.join(" "), err),
    }
}

fn main() {
    env_logger::init();

    let matches = parse_args();
    let config = config_from_matches(&matches);

    let embeddings = read_embeddings(&config.embeddings_filename, config.embedding_format)
        .or_exit("Cannot read embeddings", 1);

    let input = Input::from(config.input_filename);
    let reader = input.buf_read().or_exit("Cannot open input for reading", 1);

    for line in reader.lines() {
        let line = line.or_exit("Cannot read line", 1);
        if line.trim().is_empty() {
            continue;
        }

        match parse_query(&line) {
            Ok(query) => answer(&embeddings, query, config.k),
            Err(err) => eprintln!("{}", err),
        }
    }
}
