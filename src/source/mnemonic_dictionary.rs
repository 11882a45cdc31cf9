//! Word pages of mnemonicdictionary.com

use super::{Lookup, MnemonicSource};
use crate::{extract, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::num::NonZeroUsize;

/// Site location
pub const DEFAULT_URL: &str = "https://mnemonicdictionary.com";

/// Text that every genuine page of the site contains
///
/// Pages without it are error pages, captchas and the like.
const SITE_MARKER: &str = "MnemonicDictionary";

/// Mnemonic dictionary website
#[derive(Clone, Debug)]
pub struct MnemonicDictionary {
    /// HTTP client
    client: reqwest::Client,

    /// Site location
    base_url: Url,
}
//
impl MnemonicDictionary {
    /// Prepare to query the site at `base_url`
    pub fn new(client: reqwest::Client, base_url: Url) -> Result<Self> {
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "{base_url} cannot be used as a site location"
        );
        Ok(Self { client, base_url })
    }

    /// Location of the page of a word
    ///
    /// The word is a single path segment, so a `/` inside of it is encoded as
    /// `%2F`. The url crate drops `.` and `..` segments, which would lead to the
    /// wrong page, so these words have no page.
    pub fn page_url(&self, word: &str) -> Option<Url> {
        if matches!(word, "." | "..") {
            return None;
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .expect("site locations are checked on construction")
            .pop_if_empty()
            .push("word")
            .push(word);
        Some(url)
    }
}
//
#[async_trait]
impl MnemonicSource for MnemonicDictionary {
    fn name(&self) -> &'static str {
        "mnemonicdictionary"
    }

    async fn lookup(&self, word: &str, max: NonZeroUsize) -> Lookup {
        let Some(url) = self.page_url(word) else {
            log::debug!("{word:?} cannot be looked up on the site");
            return Lookup::failed();
        };
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("Request for {word:?} failed: {e}");
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
                log::debug!("Failed to read the page of {word:?}: {e}");
                return Lookup::nothing_at(url, status.as_u16());
            }
        };
        if !body.contains(SITE_MARKER) {
            log::debug!("Unexpected content for {word:?} (missing site marker)");
            return Lookup::nothing_at(url, status.as_u16());
        }

        let mnemonics = extract::mnemonics(&body, max);
        log::debug!("{word:?}: found {} mnemonic(s)", mnemonics.len());
        Lookup {
            mnemonics,
            page_url: Some(url.into()),
            status: Some(status.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const APPLE_PAGE: &str = "<html><head><title>apple - MnemonicDictionary</title></head><body>\
        <h2>Mnemonics (Memory Aids)</h2>\
        <p>A for Apple, easy to remember.</p>\
        <h2>Example Sentence</h2>\
        <p>An apple fell on his head.</p>\
        </body></html>";

    fn max(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn source(server: &MockServer) -> MnemonicDictionary {
        MnemonicDictionary::new(
            crate::source::http_client().unwrap(),
            server.uri().parse().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn words_are_percent_encoded() {
        let source = MnemonicDictionary::new(
            reqwest::Client::new(),
            DEFAULT_URL.parse().unwrap(),
        )
        .unwrap();
        let page = |word: &str| source.page_url(word).map(String::from);
        assert_eq!(
            page("apple").as_deref(),
            Some("https://mnemonicdictionary.com/word/apple")
        );
        assert_eq!(
            page("ice cream").as_deref(),
            Some("https://mnemonicdictionary.com/word/ice%20cream")
        );
        assert_eq!(
            page("café").as_deref(),
            Some("https://mnemonicdictionary.com/word/caf%C3%A9")
        );
    }

    #[test]
    fn words_stay_within_one_path_segment() {
        let source = MnemonicDictionary::new(
            reqwest::Client::new(),
            DEFAULT_URL.parse().unwrap(),
        )
        .unwrap();
        assert_eq!(
            source.page_url("and/or").map(String::from).as_deref(),
            Some("https://mnemonicdictionary.com/word/and%2For")
        );
        assert_eq!(source.page_url("."), None);
        assert_eq!(source.page_url(".."), None);
        assert_eq!(
            source.page_url("...").map(String::from).as_deref(),
            Some("https://mnemonicdictionary.com/word/...")
        );
    }

    #[tokio::test]
    async fn dot_words_are_not_requested() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(APPLE_PAGE))
            .expect(0)
            .mount(&server)
            .await;

        assert_eq!(source(&server).lookup("..", max(2)).await, Lookup::failed());
    }

    #[test]
    fn opaque_locations_are_rejected() {
        assert!(
            MnemonicDictionary::new(reqwest::Client::new(), "data:text/plain,x".parse().unwrap())
                .is_err()
        );
    }

    #[tokio::test]
    async fn mnemonics_are_extracted_from_word_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/word/apple"))
            .respond_with(ResponseTemplate::new(200).set_body_string(APPLE_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let lookup = source(&server).lookup("apple", max(2)).await;
        assert_eq!(lookup.mnemonics, ["A for Apple, easy to remember."]);
        assert_eq!(lookup.page_url, Some(format!("{}/word/apple", server.uri())));
        assert_eq!(lookup.status, Some(200));
    }

    #[tokio::test]
    async fn error_statuses_yield_nothing_but_keep_the_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(APPLE_PAGE))
            .mount(&server)
            .await;

        let lookup = source(&server).lookup("apple", max(2)).await;
        assert_eq!(
            lookup,
            Lookup::nothing_at(format!("{}/word/apple", server.uri()), 404)
        );
    }

    #[tokio::test]
    async fn pages_without_site_marker_are_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(APPLE_PAGE.replace("MnemonicDictionary", "Captcha")),
            )
            .mount(&server)
            .await;

        let lookup = source(&server).lookup("apple", max(2)).await;
        assert!(lookup.mnemonics.is_empty());
        assert_eq!(lookup.status, Some(200));
    }

    #[tokio::test]
    async fn unreachable_site_yields_nothing() {
        // Reserve a local port, then free it so that nothing listens there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let source = MnemonicDictionary::new(
            crate::source::http_client().unwrap(),
            format!("http://{address}").parse().unwrap(),
        )
        .unwrap();

        assert_eq!(source.lookup("apple", max(2)).await, Lookup::failed());
    }
}
