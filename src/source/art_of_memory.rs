//! Search results of the Art of Memory forum
//!
//! Forum posts are noisy, so this source is opt-in and only ever contributes
//! one mnemonic per word.

use super::{Lookup, MnemonicSource};
use crate::extract;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use scraper::{Html, Selector};
use std::{num::NonZeroUsize, sync::OnceLock};

/// Forum location
pub const DEFAULT_URL: &str = "https://forum.artofmemory.com";

/// Maximal number of posts that we take from the forum
const MAX_POSTS: usize = 1;

/// Shortest post excerpt that we consider meaningful, in characters
const MIN_EXCERPT_LEN: usize = 20;

/// Marks excerpts that come from the forum
const FORUM_PREFIX: &str = "(Forum) ";

/// Art of Memory forum
#[derive(Clone, Debug)]
pub struct ArtOfMemory {
    /// HTTP client
    client: reqwest::Client,

    /// Forum location
    base_url: Url,
}
//
impl ArtOfMemory {
    /// Prepare to query the forum at `base_url`
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Location of the forum search for mnemonics of a word
    pub fn search_url(&self, word: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("search");
        url.query_pairs_mut()
            .clear()
            .append_pair("q", &format!("{word} mnemonic"));
        url
    }
}
//
#[async_trait]
impl MnemonicSource for ArtOfMemory {
    fn name(&self) -> &'static str {
        "artofmemory"
    }

    async fn lookup(&self, word: &str, max: NonZeroUsize) -> Lookup {
        let url = self.search_url(word);
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("Forum search for {word:?} failed: {e}");
                return Lookup::failed();
            }
        };
        let status = response.status();
        log::debug!("GET {url} -> {}", status.as_u16());
        if status != StatusCode::OK {
            return Lookup::nothing_at(url, status.as_u16());
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                log::debug!("Failed to read forum results for {word:?}: {e}");
                return Lookup::nothing_at(url, status.as_u16());
            }
        };
        Lookup {
            mnemonics: excerpts(&body, max.get().min(MAX_POSTS)),
            page_url: Some(url.into()),
            status: Some(status.as_u16()),
        }
    }
}

/// Extract up to `max` post excerpts from a search result page
fn excerpts(html: &str, max: usize) -> Vec<String> {
    static EXCERPTS: OnceLock<Selector> = OnceLock::new();
    let selector = EXCERPTS.get_or_init(|| {
        Selector::parse("div.topic-excerpt, div.search-results .topic")
            .expect("excerpt selector should be valid")
    });
    Html::parse_document(html)
        .select(selector)
        .map(|excerpt| extract::clean_text(&extract::flatten_text(excerpt)))
        .filter(|excerpt| excerpt.chars().count() > MIN_EXCERPT_LEN)
        .map(|excerpt| format!("{FORUM_PREFIX}{excerpt}"))
        .take(max)
        .collect()
}
