use std::collections::BTreeMap;

use clap::{App, AppSettings, Arg, ArgMatches};
use embedding_analogy_utils::{
    eval_analogies, read_analogies, read_embeddings, Counts, EmbeddingFormat,
};
use stdinout::{Input, OrExit};

static DEFAULT_CLAP_SETTINGS: &[AppSettings] = &[
    AppSettings::DontCollapseArgsInUsage,
    AppSettings::UnifiedHelpMessage,
];

// Option constants
static EMBEDDINGS: &str = "EMBEDDINGS";
static ANALOGIES: &str = "ANALOGIES";
static FORMAT: &str = "format";

fn parse_args() -> ArgMatches<'static> {
    App::new("ea-compute-accuracy")
        .settings(DEFAULT_CLAP_SETTINGS)
        .arg(
            Arg::with_name(FORMAT)
                .short("f")
                .value_name("FORMAT")
                .help("Embedding format: text or textdims (default: text)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name(EMBEDDINGS)
                .help("Embedding file")
                .index(1)
                .required(true),
        )
        .arg(Arg::with_name(ANALOGIES).help("Analogy file").index(2))
        .get_matches()
}

struct Config {
    analogies_filename: Option<String>,
    embeddings_filename: String,
    embedding_format: EmbeddingFormat,
}

fn config_from_matches(matches: &ArgMatches) -> Config {
    let embeddings_filename = matches.value_of(EMBEDDINGS).unwrap().to_owned();
    let analogies_filename = matches.value_of(ANALOGIES).map(ToOwned::to_owned);
    let embedding_format = matches
        .value_of(FORMAT)
        .map(|f| EmbeddingFormat::try_from(f).or_exit("Cannot parse embedding format", 1))
        .unwrap_or(EmbeddingFormat::Text);

    Config {
        analogies_filename,
        embeddings_filename,
        embedding_format,
    }
}

fn print_section_accuracy(section: &str, counts: &Counts) {
    match counts.accuracy() {
        Some(accuracy) => println!(
            "{}: {}/{} correct, accuracy: {:.2}, skipped: {}",
            section, counts.n_correct, counts.n_instances, accuracy, counts.n_skipped,
        ),
        None => eprintln!("{}: no evaluation instances", section),
    }
}

fn print_accuracy(section_counts: &BTreeMap<String, Counts>) {
    for (section, counts) in section_counts {
        print_section_accuracy(section, counts);
    }

    let total = section_counts
        .values()
        .fold(Counts::default(), |acc, counts| Counts {
            n_correct: acc.n_correct + counts.n_correct,
            n_instances: acc.n_instances + counts.n_instances,
            n_skipped: acc.n_skipped + counts.n_skipped,
        });
    let n_instances_with_skipped = total.n_instances + total.n_skipped;

    println!(
        "Total: {}/{} correct, accuracy: {:.2}",
        total.n_correct,
        total.n_instances,
        total.accuracy().unwrap_or(0.)
    );

    if n_instances_with_skipped != 0 {
        println!(
            "Skipped: {}/{} ({:.2}%)",
            total.n_skipped,
            n_instances_with_skipped,
            (total.n_skipped as f64 / n_instances_with_skipped as f64) * 100.
        );
    }
}

fn main() {
    env_logger::init();

    let matches = parse_args();
    let config = config_from_matches(&matches);

    let embeddings = read_embeddings(&config.embeddings_filename, config.embedding_format)
        .or_exit("Cannot read embeddings", 1);

    let analogies_file = Input::from(config.analogies_filename);
    let reader = analogies_file
        .buf_read()
        .or_exit("Cannot open analogy file for reading", 1);

    let instances = read_analogies(reader).or_exit("Cannot read analogies", 1);
    log::info!("Evaluating {} analogy questions", instances.len());

    let section_counts = eval_analogies(&embeddings, &instances);
    print_accuracy(&section_counts);
}
