//! Delimited-text word tables
//!
//! Tables are loaded in full, annotated in memory, and written back with the
//! same columns plus the mnemonic columns. Columns that we don't know about
//! are passed through untouched.

use crate::{persist, Result};
use anyhow::Context;
use csv_async::{AsyncReaderBuilder, AsyncWriterBuilder, StringRecord};
use futures::TryStreamExt;
use std::path::Path;
use tokio::fs::File;

/// Column holding the words to be looked up
pub const WORD_COLUMN: &str = "word";

/// Column receiving the joined mnemonics
pub const MNEMONIC_COLUMN: &str = "mnemonic";

/// Column receiving the page the mnemonics came from
pub const SOURCE_URL_COLUMN: &str = "mnemonic_source_url";

/// Separator between the mnemonics of one word
pub const MNEMONIC_SEPARATOR: &str = " • ";

/// In-memory word table
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Table {
    /// Column names
    headers: Vec<String>,

    /// Rows, all padded to the width of the header
    rows: Vec<Vec<String>>,

    /// Index of the word column
    word: usize,

    /// Index of the mnemonic column
    mnemonic: usize,

    /// Index of the source URL column
    source_url: usize,
}
//
impl Table {
    /// Load a table from a file, adding the mnemonic columns if need be
    pub async fn read(path: &Path, delimiter: u8) -> Result<Self> {
        let context = || format!("reading table from {}", path.display());
        let file = File::open(path).await.with_context(context)?;
        let mut reader = AsyncReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .create_reader(file);
        let headers = reader.headers().await.with_context(context)?.clone();
        let records = reader
            .records()
            .try_collect::<Vec<StringRecord>>()
            .await
            .with_context(context)?;
        let table = Self::new(
            headers.iter().map(str::to_owned).collect(),
            records
                .iter()
                .map(|record| record.iter().map(str::to_owned).collect())
                .collect(),
        )
        .with_context(context)?;
        log::debug!("Read {} rows from {}", table.len(), path.display());
        Ok(table)
    }

    /// Build a table from raw headers and rows
    pub fn new(mut headers: Vec<String>, mut rows: Vec<Vec<String>>) -> Result<Self> {
        let word = headers
            .iter()
            .position(|header| header == WORD_COLUMN)
            .with_context(|| format!("input table must contain a {WORD_COLUMN:?} column"))?;
        let mut column = |name: &str| {
            headers.iter().position(|header| header == name).unwrap_or_else(|| {
                headers.push(name.to_owned());
                headers.len() - 1
            })
        };
        let mnemonic = column(MNEMONIC_COLUMN);
        let source_url = column(SOURCE_URL_COLUMN);
        for row in &mut rows {
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
        }
        Ok(Self {
            headers,
            rows,
            word,
            mnemonic,
            source_url,
        })
    }

    /// Write the table to a file, replacing it in one step
    pub async fn write(&self, path: &Path, delimiter: u8) -> Result<()> {
        let context = || format!("writing table to {}", path.display());
        let temp = persist::temp_path(path);
        let file = File::create(&temp).await.with_context(context)?;
        let mut writer = AsyncWriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .create_writer(file);
        writer.write_record(&self.headers).await.with_context(context)?;
        for row in &self.rows {
            writer.write_record(row).await.with_context(context)?;
        }
        writer.flush().await.with_context(context)?;
        drop(writer);
        persist::commit(path).await.with_context(context)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Column names
    #[cfg(test)]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Word of a row, trimmed
    pub fn word(&self, row: usize) -> &str {
        self.rows[row][self.word].trim()
    }

    /// Joined mnemonics of a row
    pub fn mnemonic(&self, row: usize) -> &str {
        &self.rows[row][self.mnemonic]
    }

    /// Source URL of a row
    #[cfg(test)]
    pub fn source_url(&self, row: usize) -> &str {
        &self.rows[row][self.source_url]
    }

    /// Fill in the mnemonic columns of a row
    pub fn set_mnemonics(&mut self, row: usize, mnemonics: &[String], source_url: &str) {
        let row = &mut self.rows[row];
        row[self.mnemonic] = join_mnemonics(mnemonics);
        row[self.source_url] = source_url.to_owned();
    }
}

/// Display form of a list of mnemonics, empty if there are none
pub fn join_mnemonics(mnemonics: &[String]) -> String {
    mnemonics.join(MNEMONIC_SEPARATOR)
}
