//! Mnemonic extraction from a word page of the dictionary site
//!
//! The site does not mark its mnemonics up in any structured way, so we try a
//! few strategies in order, from most to least specific, and keep the output
//! of the first one that yields anything:
//!
//! 1. Find the "Mnemonics (Memory Aids)" text, then walk the blocks that follow
//!    its element until the next heading.
//! 2. Same walk, starting from the first heading that mentions "mnemonic".
//! 3. Scan list and container elements that mention "mnemonic" and harvest
//!    their list items and paragraphs directly.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::{collections::HashSet, num::NonZeroUsize, sync::OnceLock};

/// Shortest accepted mnemonic, in characters
pub const MIN_LEN: usize = 6;

/// Longest accepted mnemonic, in characters
pub const MAX_LEN: usize = 280;

/// Blocks containing any of these are site chrome, not content
const BOILERPLATE: &[&str] = &["Download our Mobile App", "Books We Recommend"];

/// Blocks starting with these (lowercase) belong to other page sections
const FOREIGN_BLOCK_PREFIXES: &[&str] = &["definition", "synonyms"];

/// Lines starting with these (lowercase) are section titles, not mnemonics
const TITLE_LINE_PREFIXES: &[&str] = &["example sentence", "mnemonics (memory aids)"];

/// Minimal text length of a container for the container scan to consider it
const MIN_CONTAINER_LEN: usize = 40;

/// Extract up to `max` mnemonics from the HTML of a word page
pub fn mnemonics(html: &str, max: NonZeroUsize) -> Vec<String> {
    let document = Html::parse_document(html);
    for strategy in &STRATEGIES {
        let found = strategy.collect(&document, max);
        if !found.is_empty() {
            log::debug!(
                "{} strategy found {} candidate(s)",
                strategy.name(),
                found.len()
            );
            return dedup_keep_order(found, max);
        }
        log::trace!("{} strategy found nothing", strategy.name());
    }
    Vec::new()
}

/// One way to locate mnemonics in a page
trait Strategy: Sync {
    /// Name for diagnostics
    fn name(&self) -> &'static str;

    /// Collect candidates, or nothing if this strategy does not apply
    fn collect(&self, document: &Html, max: NonZeroUsize) -> Vec<String>;
}

/// Strategies, in the order in which they are tried
static STRATEGIES: [&dyn Strategy; 3] = [&HeaderByText, &HeadingByKeyword, &ContainerScan];

/// Section header found through the "Mnemonics (Memory Aids)" title text
struct HeaderByText;
//
impl Strategy for HeaderByText {
    fn name(&self) -> &'static str {
        "header-by-text"
    }

    fn collect(&self, document: &Html, max: NonZeroUsize) -> Vec<String> {
        let header = document.tree.root().descendants().find_map(|node| {
            let text = node.value().as_text()?;
            section_title()
                .is_match(text)
                .then(|| node.parent().and_then(ElementRef::wrap))
                .flatten()
        });
        header
            .map(|header| collect_section(header, max))
            .unwrap_or_default()
    }
}

/// Section header found as the first heading that mentions mnemonics
struct HeadingByKeyword;
//
impl Strategy for HeadingByKeyword {
    fn name(&self) -> &'static str {
        "heading-by-keyword"
    }

    fn collect(&self, document: &Html, max: NonZeroUsize) -> Vec<String> {
        static HEADINGS: OnceLock<Selector> = OnceLock::new();
        let headings = HEADINGS.get_or_init(|| {
            Selector::parse("h1, h2, h3, h4, h5, h6").expect("heading selector should be valid")
        });
        document
            .select(headings)
            .find(|heading| flatten_text(*heading).to_lowercase().contains("mnemonic"))
            .map(|heading| collect_section(heading, max))
            .unwrap_or_default()
    }
}

/// Lists and containers mentioning mnemonics, harvested without a header
struct ContainerScan;
//
impl Strategy for ContainerScan {
    fn name(&self) -> &'static str {
        "container-scan"
    }

    fn collect(&self, document: &Html, _max: NonZeroUsize) -> Vec<String> {
        static CONTAINERS: OnceLock<Selector> = OnceLock::new();
        static ITEMS: OnceLock<Selector> = OnceLock::new();
        let containers = CONTAINERS.get_or_init(|| {
            Selector::parse("ul, ol, div").expect("container selector should be valid")
        });
        let items = ITEMS
            .get_or_init(|| Selector::parse("li, p").expect("item selector should be valid"));
        for container in document.select(containers) {
            let text = flatten_text(container).to_lowercase();
            if !text.contains("mnemonic") || text.chars().count() <= MIN_CONTAINER_LEN {
                continue;
            }
            let found = container
                .select(items)
                .map(|item| clean_text(&flatten_text(item)))
                .filter(|item| accept_length(item))
                .collect::<Vec<_>>();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }
}

/// Walk the siblings that follow a section header and collect candidates
///
/// The walk stops at the next heading, or once `max` candidates are known.
fn collect_section(header: ElementRef<'_>, max: NonZeroUsize) -> Vec<String> {
    let mut candidates = Vec::new();
    for sibling in header.next_siblings() {
        if let Some(element) = ElementRef::wrap(sibling) {
            if is_heading(element) {
                break;
            }
            collect_block(&clean_text(&flatten_text(element)), &mut candidates);
        } else if let Some(text) = sibling.value().as_text() {
            collect_block(&clean_text(text), &mut candidates);
        }
        if candidates.len() >= max.get() {
            break;
        }
    }
    candidates
}

/// Split a whitespace-normalized block into candidate lines and keep the
/// plausible ones
fn collect_block(block: &str, candidates: &mut Vec<String>) {
    if block.is_empty() || BOILERPLATE.iter().any(|chrome| block.contains(chrome)) {
        return;
    }
    let lowercase = block.to_lowercase();
    if FOREIGN_BLOCK_PREFIXES
        .iter()
        .any(|prefix| lowercase.starts_with(prefix))
    {
        return;
    }
    for line in split_candidates(block) {
        let line = clean_text(line);
        let lowercase = line.to_lowercase();
        if line.is_empty()
            || TITLE_LINE_PREFIXES
                .iter()
                .any(|prefix| lowercase.starts_with(prefix))
        {
            continue;
        }
        let line = strip_vote_count(&line);
        if accept_length(line) {
            candidates.push(line.to_owned());
        }
    }
}

/// Truth that an element is a heading of any level
fn is_heading(element: ElementRef<'_>) -> bool {
    matches!(
        element.value().name(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

/// Concatenate the non-blank text of an element's descendants, separated by
/// single spaces
pub fn flatten_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse whitespace runs into single spaces and trim
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a block into candidate lines, after sentence-ending periods and at
/// runs of two or more spaces
///
/// Periods stay attached to the line that they end.
pub fn split_candidates(block: &str) -> Vec<&str> {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    let separator = SEPARATOR
        .get_or_init(|| Regex::new(r"\.\s+| {2,}").expect("separator regex should be valid"));
    let mut lines = Vec::new();
    let mut start = 0;
    for separator in separator.find_iter(block) {
        let end = if separator.as_str().starts_with('.') {
            separator.start() + 1
        } else {
            separator.start()
        };
        lines.push(&block[start..end]);
        start = separator.end();
    }
    lines.push(&block[start..]);
    lines
}

/// Remove the trailing "<upvotes> <downvotes>" counters that the site's
/// voting widget leaves at the end of a mnemonic
pub fn strip_vote_count(line: &str) -> &str {
    static VOTES: OnceLock<Regex> = OnceLock::new();
    let votes = VOTES
        .get_or_init(|| Regex::new(r"\s*\d+\s+\d+\s*$").expect("vote regex should be valid"));
    match votes.find(line) {
        Some(counters) => line[..counters.start()].trim(),
        None => line.trim(),
    }
}

/// Truth that a candidate has a plausible mnemonic length
pub fn accept_length(candidate: &str) -> bool {
    (MIN_LEN..=MAX_LEN).contains(&candidate.chars().count())
}

/// Drop repeated items, keeping first occurences in order, then truncate
pub fn dedup_keep_order(
    items: impl IntoIterator<Item = String>,
    max: NonZeroUsize,
) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .take(max.get())
        .collect()
}

/// Case-insensitive "Mnemonics (Memory Aids)" section title
fn section_title() -> &'static Regex {
    static LAZY: OnceLock<Regex> = OnceLock::new();
    LAZY.get_or_init(|| {
        Regex::new(r"(?i)Mnemonics\s*\(Memory Aids\)").expect("title regex should be valid")
    })
}
