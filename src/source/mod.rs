//! Remote sources of mnemonics

pub mod art_of_memory;
pub mod mnemonic_dictionary;

pub use self::{art_of_memory::ArtOfMemory, mnemonic_dictionary::MnemonicDictionary};

use crate::{
    config::{Config, Pacing, SourceKind},
    extract, Result,
};
use anyhow::Context;
use async_trait::async_trait;
use std::{num::NonZeroUsize, time::Duration};

/// Browser-like user agent, some sites reject obvious bots
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X) AppleWebKit/605.1.15 \
                              (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

/// Upper bound on the duration of one request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(25);

/// Set up the HTTP client shared by all sources
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("setting up the HTTP client")
}

/// Outcome of looking up a word
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Lookup {
    /// Mnemonics that were found, in page order
    pub mnemonics: Vec<String>,

    /// Page that was looked at, unless the request could not be made
    pub page_url: Option<String>,

    /// HTTP status of the response, unless the request failed
    pub status: Option<u16>,
}
//
impl Lookup {
    /// Request failed before any response came back
    pub fn failed() -> Self {
        Self::default()
    }

    /// A page was reached, but did not contain any mnemonic
    pub fn nothing_at(page_url: impl Into<String>, status: u16) -> Self {
        Self {
            mnemonics: Vec::new(),
            page_url: Some(page_url.into()),
            status: Some(status),
        }
    }
}

/// Something that can look up the mnemonics of a word
#[async_trait]
pub trait MnemonicSource: Send + Sync {
    /// Name for diagnostics
    fn name(&self) -> &'static str;

    /// Look up at most `max` mnemonics for a word
    ///
    /// Failures are not errors: they are reported in logs and translate into
    /// a [`Lookup`] with no mnemonics.
    async fn lookup(&self, word: &str, max: NonZeroUsize) -> Lookup;
}

/// Sources queried one after another until enough mnemonics are known
pub struct SourceChain {
    /// Sources, in query order
    sources: Vec<Box<dyn MnemonicSource>>,

    /// Delay after each live lookup
    pacing: Pacing,
}
//
impl SourceChain {
    /// Chain some sources
    pub fn new(sources: Vec<Box<dyn MnemonicSource>>, pacing: Pacing) -> Self {
        Self { sources, pacing }
    }

    /// Set up the sources requested by the configuration
    pub fn from_config(config: &Config, client: reqwest::Client) -> Result<Self> {
        let sources = (config.sources.iter())
            .map(|kind| -> Result<Box<dyn MnemonicSource>> {
                let source: Box<dyn MnemonicSource> = match kind {
                    SourceKind::MnemonicDictionary => Box::new(MnemonicDictionary::new(
                        client.clone(),
                        config.dictionary_url.clone(),
                    )?),
                    SourceKind::ArtOfMemory => {
                        Box::new(ArtOfMemory::new(client.clone(), config.forum_url.clone()))
                    }
                };
                Ok(source)
            })
            .collect::<Result<Vec<_>>>()?;
        anyhow::ensure!(!sources.is_empty(), "at least one mnemonic source is needed");
        Ok(Self::new(sources, config.pacing))
    }

    /// Individual sources
    pub fn sources(&self) -> impl Iterator<Item = &dyn MnemonicSource> + '_ {
        self.sources.iter().map(|source| &**source)
    }

    /// Look a word up
    ///
    /// The status is that of the first source, the URL that of the last source
    /// which contributed mnemonics, or none if nothing was found.
    pub async fn lookup(&self, word: &str, max: NonZeroUsize) -> Lookup {
        let mut mnemonics = Vec::new();
        let mut page_url = None;
        let mut status = None;
        for (idx, source) in self.sources.iter().enumerate() {
            if mnemonics.len() >= max.get() {
                break;
            }
            let found = source.lookup(word, max).await;
            self.pacing.pause().await;
            if idx == 0 {
                status = found.status;
            }
            if !found.mnemonics.is_empty() {
                log::debug!(
                    "{} has {} mnemonic(s) for {word:?}",
                    source.name(),
                    found.mnemonics.len()
                );
                mnemonics.extend(found.mnemonics);
                page_url = found.page_url.or(page_url);
            }
        }
        Lookup {
            mnemonics: extract::dedup_keep_order(mnemonics, max),
            page_url,
            status,
        }
    }
}
