//! Processing configuration

use crate::{Args, Result};
use clap::ValueEnum;
use rand::Rng;
use reqwest::Url;
use std::{num::NonZeroUsize, path::PathBuf, time::Duration};

/// Final process configuration
///
/// This is the result of digesting [`Args`]. Please refer to [`Args`] to know
/// more about individual fields.
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Mnemonic sources, in query order
    pub sources: Box<[SourceKind]>,

    /// Cache location, if caching is enabled
    pub cache_path: Option<PathBuf>,

    /// Delay after each live lookup
    pub pacing: Pacing,

    /// Field delimiter of the input and output tables
    pub delimiter: u8,

    // Other fields have the same meaning as in Args
    pub max_per_word: NonZeroUsize,
    pub overwrite: bool,
    pub limit: Option<usize>,
    pub flush_every: Option<NonZeroUsize>,
    pub dictionary_url: Url,
    pub forum_url: Url,
}
//
impl Config {
    /// Determine process configuration from CLI arguments
    pub(crate) fn new(args: &Args) -> Result<Self> {
        Ok(Self {
            sources: args.sources.iter().copied().collect(),
            cache_path: (!args.no_cache).then(|| args.cache.clone()),
            pacing: Pacing {
                base: Duration::from_millis(args.delay_ms),
                jitter: Duration::from_millis(args.jitter_ms),
            },
            delimiter: parse_delimiter(&args.delimiter)?,
            max_per_word: args.max_per_word,
            overwrite: args.overwrite,
            limit: args.limit,
            flush_every: NonZeroUsize::new(args.flush_every),
            dictionary_url: args.dictionary_url.clone(),
            forum_url: args.forum_url.clone(),
        })
    }
}

/// Known mnemonic sources
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, ValueEnum)]
pub enum SourceKind {
    /// Word pages of mnemonicdictionary.com
    #[value(name = "mnemonicdictionary")]
    MnemonicDictionary,

    /// Search results of the Art of Memory forum (noisy, opt-in)
    #[value(name = "artofmemory")]
    ArtOfMemory,
}

/// Self-imposed rate limit between live lookups
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pacing {
    /// Minimal delay
    pub base: Duration,

    /// Upper bound of the random extra delay
    pub jitter: Duration,
}
//
impl Pacing {
    /// No delay at all
    #[cfg(test)]
    pub const fn none() -> Self {
        Self {
            base: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Pick the next delay, in `[base, base + jitter)`
    pub fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.base;
        }
        self.base + self.jitter.mul_f64(rand::thread_rng().gen::<f64>())
    }

    /// Wait before the next live lookup
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            log::trace!("Pausing for {delay:?}");
            tokio::time::sleep(delay).await;
        }
    }
}

/// Decode a single-byte field delimiter, with `\t` standing for a tab
fn parse_delimiter(delimiter: &str) -> Result<u8> {
    match delimiter {
        "\\t" | "tab" => Ok(b'\t'),
        _ => {
            let bytes = delimiter.as_bytes();
            anyhow::ensure!(
                bytes.len() == 1,
                "table delimiter must be a single ASCII character, got {delimiter:?}"
            );
            Ok(bytes[0])
        }
    }
}
