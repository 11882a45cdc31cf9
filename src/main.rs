//! This program fills a word table with mnemonics from
//! <https://mnemonicdictionary.com>, caching what it finds on disk so that
//! long runs can be interrupted and resumed.

mod cache;
mod config;
mod extract;
mod merge;
mod persist;
mod progress;
mod source;
mod table;

use crate::{
    cache::MnemonicCache,
    config::{Config, SourceKind},
    progress::ProgressReport,
    source::{art_of_memory, mnemonic_dictionary, Lookup, SourceChain},
    table::Table,
};
use clap::Parser;
use reqwest::Url;
use std::{num::NonZeroUsize, path::PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing_subscriber::EnvFilter;

/// Look up mnemonics for the words of a table
///
/// Words are read from the "word" column of the input table. Mnemonics found
/// online are joined with " • " into a "mnemonic" column, and the page they
/// came from goes into a "mnemonic_source_url" column. Other columns are
/// copied as-is.
#[derive(Parser, Debug)]
#[command(version, author)]
struct Args {
    /// Input table, which must have a "word" column
    #[arg(short, long, required_unless_present = "test")]
    input: Option<PathBuf>,

    /// Output table
    ///
    /// Partial versions are written while the run progresses, see
    /// `--flush-every`.
    #[arg(short, long, required_unless_present = "test")]
    output: Option<PathBuf>,

    /// Maximal number of mnemonics to keep per word
    #[arg(short, long, default_value = "2")]
    max_per_word: NonZeroUsize,

    /// Replace existing mnemonics
    ///
    /// This also ignores cached lookups: every word is looked up again, and
    /// the cache is updated with the new results.
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// JSON cache of past lookups, used to resume interrupted runs
    #[arg(long, default_value = "mnemonics_cache.json")]
    cache: PathBuf,

    /// Neither read nor write the cache
    #[arg(long, default_value_t = false)]
    no_cache: bool,

    /// Log diagnostics to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Process at most this many rows, for quick tests
    ///
    /// Rows with a blank word do not count.
    #[arg(long)]
    limit: Option<usize>,

    /// Write the partial output table every N processed rows (0 = never)
    #[arg(long, default_value = "20")]
    flush_every: usize,

    /// Look up a single word, print its mnemonics, and exit
    ///
    /// Tables and cache are left alone in this mode.
    #[arg(long, value_name = "WORD")]
    test: Option<String>,

    /// Field delimiter of the input and output tables ("\t" for TSV)
    #[arg(short, long, default_value = ",")]
    delimiter: String,

    /// Mnemonic sources, in query order
    ///
    /// Later sources are only queried when earlier ones did not provide
    /// enough mnemonics.
    #[arg(long, value_enum, num_args = 1.., value_delimiter = ',', default_value = "mnemonicdictionary")]
    sources: Vec<SourceKind>,

    /// Minimal pause after each live lookup, in milliseconds
    #[arg(long, default_value = "1300")]
    delay_ms: u64,

    /// Maximal random extra pause after each live lookup, in milliseconds
    #[arg(long, default_value = "700")]
    jitter_ms: u64,

    /// Location of the mnemonic dictionary
    #[arg(long, hide = true, default_value = mnemonic_dictionary::DEFAULT_URL)]
    dictionary_url: Url,

    /// Location of the Art of Memory forum
    #[arg(long, hide = true, default_value = art_of_memory::DEFAULT_URL)]
    forum_url: Url,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Decode CLI arguments
    let args = Args::parse();

    // Set up logging
    setup_logging(args.verbose || args.test.is_some())?;

    // Set up mnemonic sources
    let config = Config::new(&args)?;
    let sources = SourceChain::from_config(&config, source::http_client()?)?;

    // Single-word mode leaves tables and cache alone
    if let Some(word) = args.test.as_deref() {
        return print_lookups(&sources, word, config.max_per_word).await;
    }
    let (Some(input), Some(output)) = (&args.input, &args.output) else {
        anyhow::bail!("input and output tables are required outside of test mode");
    };

    // Load the table first, so that a bad table fails before any lookup
    let mut table = Table::read(input, config.delimiter).await?;
    let mut cache = match &config.cache_path {
        Some(path) => Some(MnemonicCache::load(path).await),
        None => None,
    };

    // Progress bars and verbose logs don't mix well
    let report = if args.verbose {
        ProgressReport::hidden()
    } else {
        ProgressReport::new()
    };

    let summary =
        merge::process(&config, &mut table, cache.as_mut(), &sources, output, &report).await?;
    println!("Wrote {} ({summary})", output.display());
    Ok(())
}

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// Look a word up in each source and print what was found
async fn print_lookups(sources: &SourceChain, word: &str, max: NonZeroUsize) -> Result<()> {
    let mut stdout = BufWriter::new(tokio::io::stdout());
    for source in sources.sources() {
        let lookup = source.lookup(word, max).await;
        stdout
            .write_all(describe_lookup(source.name(), word, &lookup).as_bytes())
            .await?;
    }
    stdout.flush().await?;
    Ok(())
}

/// Human-readable report of one source's lookup
///
/// A failed request has no URL, shown as "-", and HTTP status -1.
fn describe_lookup(source: &str, word: &str, lookup: &Lookup) -> String {
    let mut report = format!(
        "SOURCE: {source}\nWORD: {word}\nURL : {}\nHTTP: {}\nMNEMONICS:\n",
        lookup.page_url.as_deref().unwrap_or("-"),
        lookup.status.map_or(-1, i32::from),
    );
    for (idx, mnemonic) in lookup.mnemonics.iter().enumerate() {
        report.push_str(&format!("{}. {mnemonic}\n", idx + 1));
    }
    report
}

/// Set up logging to stderr
fn setup_logging(verbose: bool) -> Result<()> {
    let level = if cfg!(feature = "log-trace") {
        "trace"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}={level}", module_path!())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::format_err!("{e}"))
}
