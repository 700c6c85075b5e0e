//! Reading exported tables back into typed rows.
//!
//! This is the dynamic boundary of the crate: rows come in as text and are
//! only trusted after [`crate::verify`] has matched them against the model.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::delimiter::Delimiter;
use crate::error::ExportError;

/// Parse delimited text whose first line must equal `header`.
///
/// `source` only labels errors.
///
/// # Errors
///
/// Returns [`ExportError::HeaderMismatch`] if the header differs, or
/// [`ExportError::Csv`] if a row cannot be decoded.
pub fn parse_table<T: DeserializeOwned>(
    source: &Path,
    text: &[u8],
    header: &[&str],
    delimiter: Delimiter,
) -> Result<Vec<T>, ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(true)
        .from_reader(text);

    let found: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    if found.iter().map(String::as_str).ne(header.iter().copied()) {
        return Err(ExportError::HeaderMismatch {
            path: source.to_path_buf(),
            expected: header.join(","),
            found: found.join(","),
        });
    }

    reader
        .deserialize()
        .map(|record| record.map_err(ExportError::from))
        .collect()
}

/// Read and parse a table from disk.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be read, otherwise the
/// errors of [`parse_table`].
pub fn read_table<T: DeserializeOwned>(
    path: &Path,
    header: &[&str],
    delimiter: Delimiter,
) -> Result<Vec<T>, ExportError> {
    let text = std::fs::read(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(path, &text, header, delimiter)
}
