//! Error types for the `eventseed-catalog` crate.
//!
//! All fallible operations in this crate return [`CatalogError`].

use std::path::PathBuf;

/// Errors that can occur while loading or building the event catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The catalog document is not valid YAML for the expected shape.
    #[error("failed to parse catalog YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// A year window ends before it starts.
    #[error("year window {first_year}..={last_year} is inverted")]
    InvertedWindow {
        /// First year of the window.
        first_year: i32,
        /// Last year of the window.
        last_year: i32,
    },

    /// The past and future windows share at least one year.
    #[error("past window ends in {past_last}, which is not before future window start {future_first}")]
    OverlappingWindows {
        /// Last year of the past window.
        past_last: i32,
        /// First year of the future window.
        future_first: i32,
    },

    /// A sampled calendar combination does not exist.
    #[error("invalid start time {year:04}-{month:02}-{day:02} {hour:02}:00")]
    InvalidDate {
        /// Sampled year.
        year: i32,
        /// Sampled month.
        month: u32,
        /// Sampled day.
        day: u32,
        /// Sampled hour.
        hour: u32,
    },

    /// An event was given an empty display name.
    #[error("event in category '{category}' has an empty name")]
    EmptyEventName {
        /// Category the event was being added to.
        category: String,
    },

    /// The builder's id sequence has handed out every id.
    #[error("no event ids left for '{event}' in category '{category}'")]
    IdsExhausted {
        /// Category the event was being added to.
        category: String,
        /// Name of the event that could not be numbered.
        event: String,
    },

    /// An event was created but could not be read back from the catalog.
    #[error("event {0} was not stored in the catalog")]
    EventNotStored(eventseed_types::EventId),
}
