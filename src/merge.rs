//! Merging of looked up mnemonics into a word table

use crate::{
    cache::MnemonicCache,
    config::Config,
    progress::{ProgressReport, ProgressTracker},
    source::SourceChain,
    table::Table,
    Result,
};
use std::{fmt, path::Path};

/// What happened during a merge
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// Rows that count towards the row limit
    pub processed: usize,

    /// Rows that already had mnemonics and were left alone
    pub kept: usize,

    /// Rows that were filled from the cache
    pub cache_hits: usize,

    /// Words that were looked up on the network
    pub fetched: usize,

    /// Network lookups that found at least one mnemonic
    pub found: usize,
}
//
impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            processed,
            kept,
            cache_hits,
            fetched,
            found,
        } = self;
        write!(
            f,
            "{processed} rows processed: {kept} kept, {cache_hits} from cache, \
             {fetched} looked up ({found} with mnemonics)"
        )
    }
}

/// Fill in the mnemonic columns of a table
///
/// Rows are handled in order. Words that the cache knows about are not looked
/// up again, unless `overwrite` is set, and every live lookup is saved to the
/// cache immediately so that an interrupted run can be resumed. The table is
/// written to `output` every `flush_every` processed rows, and once more at the
/// end no matter how the loop ended.
pub async fn process(
    config: &Config,
    table: &mut Table,
    mut cache: Option<&mut MnemonicCache>,
    sources: &SourceChain,
    output: &Path,
    report: &ProgressReport,
) -> Result<Summary> {
    let tracker = report.add("Looking up mnemonics", table.len());
    let outcome = merge_rows(config, table, cache.as_deref_mut(), sources, output, &tracker).await;
    tracker.finish();
    if let Some(cache) = cache.as_deref() {
        log::debug!("Cache now knows {} words", cache.len());
    }

    // Save whatever we have, even if the merge failed midway
    table.write(output, config.delimiter).await?;
    log::debug!("Wrote final output to {}", output.display());
    let summary = outcome?;
    log::info!("{summary}");
    Ok(summary)
}

/// Row loop of [`process()`]
async fn merge_rows(
    config: &Config,
    table: &mut Table,
    mut cache: Option<&mut MnemonicCache>,
    sources: &SourceChain,
    output: &Path,
    tracker: &ProgressTracker,
) -> Result<Summary> {
    let mut summary = Summary::default();
    for row in 0..table.len() {
        if config.limit.is_some_and(|limit| summary.processed >= limit) {
            log::debug!("Stopping after {} processed rows", summary.processed);
            break;
        }
        let word = table.word(row).to_owned();
        tracker.make_progress(word.clone());
        if word.is_empty() {
            continue;
        }

        if !config.overwrite && !table.mnemonic(row).trim().is_empty() {
            log::debug!("Keeping existing mnemonic of {word:?}");
            summary.processed += 1;
            summary.kept += 1;
            continue;
        }

        let cached = if config.overwrite {
            None
        } else {
            cache.as_deref().and_then(|cache| cache.get(&word))
        };
        if let Some(entry) = cached {
            log::debug!("Cache hit for {word:?}: {} item(s)", entry.mnemonics.len());
            table.set_mnemonics(row, &entry.mnemonics, &entry.source_url);
            summary.cache_hits += 1;
        } else {
            let lookup = sources.lookup(&word, config.max_per_word).await;
            log::debug!(
                "Done with {word:?}: HTTP {}, saved {} mnemonic(s)",
                lookup.status.map_or(-1, i32::from),
                lookup.mnemonics.len()
            );
            table.set_mnemonics(
                row,
                &lookup.mnemonics,
                lookup.page_url.as_deref().unwrap_or_default(),
            );
            summary.fetched += 1;
            if !lookup.mnemonics.is_empty() {
                summary.found += 1;
            }
            if let Some(cache) = cache.as_deref_mut() {
                cache.insert(&word, lookup.into());
                cache.save().await?;
            }
        }

        summary.processed += 1;
        if let Some(flush_every) = config.flush_every {
            if summary.processed % flush_every.get() == 0 {
                table.write(output, config.delimiter).await?;
                log::debug!("Wrote partial output to {}", output.display());
            }
        }
    }
    Ok(summary)
}
