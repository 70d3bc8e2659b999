//! Dataset loading and context rendering.
//!
//! This module loads the FAQ spreadsheet exported as CSV, normalizes it, and
//! renders a bounded plain-text table that can be embedded into a system prompt.

use std::fs;
use std::path::Path;

use thiserror::Error;

/// Placeholder written in place of blank fields.
///
/// An explicit token keeps the model from reading an absent value as zero or "no".
pub const MISSING_VALUE: &str = "N/A";

/// Marker appended when the rendered table exceeds the character ceiling.
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Errors that can occur while loading the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be read
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The dataset file is not valid CSV
    #[error("Failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),
}

/// Size ceilings applied when summarizing a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    /// Maximum number of data rows rendered
    pub max_rows: usize,
    /// Maximum number of characters in the rendered table, marker excluded
    pub max_chars: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_rows: 50,
            max_chars: 5000,
        }
    }
}

/// A normalized tabular dataset.
///
/// Columns without a name are removed, fully blank rows are dropped and the
/// remaining blank fields hold [`MISSING_VALUE`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Loads and normalizes a CSV file.
    ///
    /// Files that are not valid UTF-8 are decoded as Latin-1, and the field
    /// separator (`,` or `;`) is detected from the header line.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::Io` if the file cannot be read and
    /// `DatasetError::Csv` if its content cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let bytes = fs::read(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_bytes(&bytes)
    }

    /// Parses and normalizes CSV content already held in memory.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::Csv` if the content cannot be parsed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatasetError> {
        let text = decode(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(sniff_delimiter(&text))
            .flexible(true)
            .from_reader(text.as_bytes());

        let raw_headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // Indices of the columns that survive normalization
        let kept: Vec<usize> = raw_headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !is_unnamed(header))
            .map(|(i, _)| i)
            .collect();

        let headers = kept.iter().map(|&i| raw_headers[i].clone()).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let fields: Vec<&str> = kept
                .iter()
                .map(|&i| record.get(i).unwrap_or("").trim())
                .collect();

            if fields.iter().all(|field| field.is_empty()) {
                continue;
            }

            rows.push(
                fields
                    .into_iter()
                    .map(|field| {
                        if field.is_empty() {
                            MISSING_VALUE.to_string()
                        } else {
                            field.to_string()
                        }
                    })
                    .collect(),
            );
        }

        Ok(Self { headers, rows })
    }

    /// Returns the column names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the normalized data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the dataset as an aligned text table bounded by `limits`.
    ///
    /// Only the first `max_rows` rows are rendered. If the table is still
    /// longer than `max_chars` characters it is cut and [`TRUNCATION_MARKER`]
    /// is appended.
    pub fn summarize(&self, limits: &ContextLimits) -> String {
        let shown = &self.rows[..self.rows.len().min(limits.max_rows)];
        let table = render_table(&self.headers, shown);
        truncate_chars(&table, limits.max_chars)
    }
}

/// Decodes file content as UTF-8, falling back to Latin-1.
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim_start_matches('\u{feff}').to_string(),
        // Every byte is a valid Latin-1 code point
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Picks `;` when the header line uses it more often than `,`.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();

    if semicolons > commas { b';' } else { b',' }
}

/// Columns produced by stray trailing separators carry no name.
fn is_unnamed(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed")
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:>width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    std::iter::once(render_line(headers))
        .chain(rows.iter().map(|row| render_line(row.as_slice())))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
