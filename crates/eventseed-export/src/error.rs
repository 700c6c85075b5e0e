//! Error types for the `eventseed-export` crate.

use std::path::PathBuf;

use eventseed_types::EventId;

/// Errors raised while flattening, writing, reading or verifying tables.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A destination could not be written or a table could not be read.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV layer failed to encode or decode a record.
    #[error("delimited text error: {source}")]
    Csv {
        /// The underlying csv error.
        #[from]
        source: csv::Error,
    },

    /// The configured delimiter cannot be used.
    #[error("invalid delimiter {delimiter:?}: must be a single ASCII character other than a quote or line break")]
    InvalidDelimiter {
        /// The rejected delimiter.
        delimiter: char,
    },

    /// A table's header line does not match the expected columns.
    #[error("unexpected header in {path}: expected [{expected}], found [{found}]")]
    HeaderMismatch {
        /// The file involved.
        path: PathBuf,
        /// Expected column names joined by commas.
        expected: String,
        /// Column names actually found, joined by commas.
        found: String,
    },

    /// A user references an event id the catalog does not contain.
    #[error("user '{user}' references event {event}, which is not in the catalog")]
    UnknownEvent {
        /// Name of the user.
        user: String,
        /// The unresolved event id.
        event: EventId,
    },

    /// A written table does not agree with the in-memory model.
    #[error("{table} table failed verification: {message}")]
    Verification {
        /// Table name.
        table: &'static str,
        /// What did not match.
        message: String,
    },
}
