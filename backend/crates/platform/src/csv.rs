//! CSV export writer
//!
//! RFC 4180 output for admin exports, written with the `csv` crate. Cells
//! that a spreadsheet would evaluate as a formula are prefixed with `'`.

use std::borrow::Cow;

use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

#[derive(Debug, Error)]
pub enum CsvExportError {
    #[error("CSV write failed: {0}")]
    Write(#[from] ::csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Flush(String),

    #[error("CSV output is not UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub type CsvResult<T> = Result<T, CsvExportError>;

pub struct CsvWriter {
    inner: ::csv::Writer<Vec<u8>>,
    columns: usize,
}

impl CsvWriter {
    pub fn new() -> Self {
        let inner = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .flexible(true)
            .from_writer(Vec::new());
        Self { inner, columns: 0 }
    }

    pub fn with_header<I, S>(header: I) -> CsvResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut writer = Self::new();
        writer.columns = writer.push_row(header)?;
        Ok(writer)
    }

    /// Append one record. Returns the number of cells written.
    pub fn push_row<I, S>(&mut self, cells: I) -> CsvResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let record: Vec<String> = cells
            .into_iter()
            .map(|cell| neutralise_formula(cell.as_ref()).into_owned())
            .collect();
        self.inner.write_record(&record)?;

        if self.columns > 0 && record.len() != self.columns {
            tracing::warn!(expected = self.columns, actual = record.len(), "CSV row width mismatch");
        }
        Ok(record.len())
    }

    pub fn finish(self) -> CsvResult<String> {
        let bytes = self
            .inner
            .into_inner()
            .map_err(|e| CsvExportError::Flush(e.error().to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn neutralise_formula(value: &str) -> Cow<'_, str> {
    match value.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => Cow::Owned(format!("'{}", value)),
        _ => Cow::Borrowed(value),
    }
}

/// Filename for a `Content-Disposition` header, e.g. `stories-20261017.csv`.
pub fn export_filename(prefix: &str, date: chrono::NaiveDate) -> String {
    format!("{}-{}.csv", prefix, date.format("%Y%m%d"))
}
