//! On-disk cache of past lookups, keyed by lowercase word
//!
//! The cache is what makes interrupted runs resumable: it is saved after every
//! live lookup, and words that it knows about are not fetched again.

use crate::{persist, source::Lookup, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::fs;

/// What we remember about one word
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CacheEntry {
    /// Mnemonics that were found, possibly none
    #[serde(default)]
    pub mnemonics: Vec<String>,

    /// Page the mnemonics came from, empty if none were found
    #[serde(default)]
    pub source_url: String,
}
//
impl From<Lookup> for CacheEntry {
    fn from(lookup: Lookup) -> Self {
        Self {
            mnemonics: lookup.mnemonics,
            source_url: lookup.page_url.unwrap_or_default(),
        }
    }
}

/// Lookup cache backed by a JSON file
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MnemonicCache {
    /// Location of the backing file
    path: PathBuf,

    /// Known entries, sorted so that the JSON file diffs well across runs
    entries: BTreeMap<String, CacheEntry>,
}
//
impl MnemonicCache {
    /// Load the cache from `path`
    ///
    /// A missing or unreadable cache file is not an error, it just means that
    /// we start from scratch.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path).await {
            Ok(Some(entries)) => {
                log::debug!("Loaded {} cache entries from {}", entries.len(), path.display());
                entries
            }
            Ok(None) => {
                log::debug!("No cache at {}", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                log::warn!("Ignoring unusable cache: {e:#}");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    /// Read cache entries, if there is a cache file
    ///
    /// Entries that record nothing at all (`{}`) are dropped, so that the
    /// corresponding words are looked up again.
    async fn read_entries(path: &Path) -> Result<Option<BTreeMap<String, CacheEntry>>> {
        let context = || format!("loading cache from {}", path.display());
        let json = match fs::read(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(context),
        };
        let raw: BTreeMap<String, serde_json::Map<String, serde_json::Value>> =
            serde_json::from_slice(&json).with_context(context)?;
        raw.into_iter()
            .filter(|(word, fields)| {
                if fields.is_empty() {
                    log::debug!("Ignoring empty cache entry for {word:?}");
                }
                !fields.is_empty()
            })
            .map(|(word, fields)| {
                let entry: CacheEntry = serde_json::from_value(serde_json::Value::Object(fields))
                    .with_context(|| format!("decoding cache entry for {word:?}"))?;
                Ok((word, entry))
            })
            .collect::<Result<_>>()
            .map(Some)
            .with_context(context)
    }

    /// Save the cache to its backing file
    pub async fn save(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.entries).context("converting cache to JSON")?;
        persist::write_atomically(&self.path, &json)
            .await
            .context("saving cache to disk")?;
        log::debug!("Wrote {} cache entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }

    /// Look up what we know about a word
    ///
    /// An entry with no mnemonics is still a valid answer: the word was looked
    /// up before and nothing was found.
    pub fn get(&self, word: &str) -> Option<&CacheEntry> {
        self.entries.get(&key(word))
    }

    /// Record what we learned about a word
    pub fn insert(&mut self, word: &str, entry: CacheEntry) {
        self.entries.insert(key(word), entry);
    }

    /// Number of known words
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Cache key of a word
fn key(word: &str) -> String {
    word.to_lowercase()
}
