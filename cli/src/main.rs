use anyhow::Result;
use clap::{Parser, Subcommand};
use ircore::{
    BooleanOptions, BooleanSearchEngine, Corpus, IndexConfig, InMemoryCorpus, InMemoryInvertedIndex, InvertedIndex,
    NormalizerKind, RankerKind, SearchOptions, SimpleSearchEngine, TokenizerKind,
};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ir")]
#[command(about = "Build an in-memory inverted index over a corpus and query it", long_about = None)]
struct Cli {
    /// Corpus file or directory (.txt, .tsv, .json, .jsonl)
    #[arg(long)]
    corpus: PathBuf,
    /// Document field to index; repeat for several
    #[arg(long = "field", default_value = "body")]
    fields: Vec<String>,
    /// Variable-byte compress the posting lists
    #[arg(long, default_value_t = false)]
    compressed: bool,
    #[arg(long, default_value_t = NormalizerKind::Simple)]
    normalizer: NormalizerKind,
    #[arg(long, default_value_t = TokenizerKind::Simple)]
    tokenizer: TokenizerKind,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print index statistics
    Stats,
    /// Show the terms a text is normalized to
    Terms {
        /// Text to analyze; read line by line from stdin if omitted
        text: Option<String>,
    },
    /// Unranked Boolean retrieval, e.g. AND(cat, OR(sat, 'ran away'))
    Boolean {
        /// Evaluate operands in query order
        #[arg(long, default_value_t = false)]
        no_optimize: bool,
        /// Print the evaluation plan instead of matching documents
        #[arg(long, default_value_t = false)]
        explain: bool,
        /// Query expression; read line by line from stdin if omitted
        query: Option<String>,
    },
    /// Ranked N-of-M retrieval
    Search {
        /// Fraction of unique query terms a document must contain
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,
        /// Maximum number of hits to return
        #[arg(long, default_value_t = 10)]
        hit_count: usize,
        #[arg(long, default_value_t = RankerKind::Simple)]
        ranker: RankerKind,
        /// Query text; read line by line from stdin if omitted
        query: Option<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(cli, stdin.lock(), &mut stdout.lock())
}

fn run(cli: Cli, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    let corpus = InMemoryCorpus::load(&cli.corpus)?;
    let config = IndexConfig {
        fields: cli.fields,
        compressed: cli.compressed,
        normalizer: cli.normalizer,
        tokenizer: cli.tokenizer,
    };
    let index = config.build(&corpus);

    match cli.command {
        Commands::Stats => emit(out, &stats(&corpus, &index)),
        Commands::Terms { text } => each_line(text, input, out, |text| terms(&index, text)),
        Commands::Boolean { no_optimize, explain, query } => {
            let engine = BooleanSearchEngine::new(&corpus, &index);
            let options = BooleanOptions { optimize: !no_optimize };
            each_line(query, input, out, |query| boolean(&engine, query, &options, explain))
        }
        Commands::Search { threshold, hit_count, ranker, query } => {
            let options = SearchOptions { match_threshold: threshold, hit_count };
            each_line(query, input, out, |query| search(&corpus, &index, query, &options, ranker))
        }
    }
}

/// Answers `single` if given, otherwise every non-blank line of `input`.
fn each_line(
    single: Option<String>,
    input: impl BufRead,
    out: &mut impl Write,
    mut answer: impl FnMut(&str) -> Value,
) -> Result<()> {
    if let Some(line) = single {
        return emit(out, &answer(&line));
    }
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        emit(out, &answer(line))?;
    }
    Ok(())
}

fn emit(out: &mut impl Write, value: &Value) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn stats(corpus: &InMemoryCorpus, index: &InMemoryInvertedIndex) -> Value {
    json!({
        "documents": corpus.size(),
        "terms": index.dictionary().size(),
        "posting_bytes": index.heap_size(),
    })
}

fn terms(index: &dyn InvertedIndex, text: &str) -> Value {
    let terms: Vec<Value> = index
        .get_terms(text)
        .map(|term| {
            json!({
                "term": term,
                "document_frequency": index.get_document_frequency(&term),
                "collection_frequency": index.get_collection_frequency(&term),
            })
        })
        .collect();
    json!({ "text": text, "terms": terms })
}

fn boolean(engine: &BooleanSearchEngine<'_>, query: &str, options: &BooleanOptions, explain: bool) -> Value {
    if explain {
        return match engine.plan(query, options) {
            Ok(plan) => json!({ "query": query, "plan": plan.to_string() }),
            Err(e) => json!({ "query": query, "error": e.to_string() }),
        };
    }
    match engine.evaluate(query, options) {
        Ok(documents) => {
            let documents: Vec<Value> = documents.map(|d| json!(d)).collect();
            json!({ "query": query, "count": documents.len(), "documents": documents })
        }
        Err(e) => {
            tracing::warn!(query, error = %e, "rejected boolean query");
            json!({ "query": query, "error": e.to_string() })
        }
    }
}

fn search(
    corpus: &dyn Corpus,
    index: &dyn InvertedIndex,
    query: &str,
    options: &SearchOptions,
    ranker: RankerKind,
) -> Value {
    let engine = SimpleSearchEngine::new(corpus, index);
    let mut ranker = ranker.create(corpus, index);
    let hits: Vec<Value> = engine.evaluate(query, options, ranker.as_mut()).map(|hit| json!(hit)).collect();
    json!({ "query": query, "hits": hits })
}
