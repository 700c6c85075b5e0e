//! The keyword catalog and how event keyword ids are turned into keywords.

use std::collections::BTreeMap;

use eventseed_types::Keyword;
use serde::{Deserialize, Serialize};

/// How keyword ids listed on an event are attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMode {
    /// Attach the id string itself as the keyword, with no lookup.
    #[default]
    Raw,
    /// Look the id up in the [`KeywordCatalog`] and attach its label;
    /// unknown ids are skipped with a warning.
    Resolve,
}

/// Fixed set of named tags, keyed by keyword id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordCatalog {
    entries: BTreeMap<String, Keyword>,
}

impl KeywordCatalog {
    /// Build a catalog from `(id, label)` pairs. Later duplicates of an id
    /// replace earlier ones.
    pub fn from_labels<I, K, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<String>,
        L: Into<String>,
    {
        let entries = labels
            .into_iter()
            .map(|(id, label)| (id.into(), Keyword::new(label)))
            .collect();
        Self { entries }
    }

    /// Look up a keyword by id.
    pub fn resolve(&self, id: &str) -> Option<&Keyword> {
        self.entries.get(id)
    }

    /// Number of keywords in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no keywords.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_ids() {
        let catalog = KeywordCatalog::from_labels([("rock_music", "Rock Music"), ("live", "Live")]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.resolve("rock_music").map(|k| k.name.as_str()),
            Some("Rock Music")
        );
        assert!(catalog.resolve("polka").is_none());
    }

    #[test]
    fn raw_is_default_mode() {
        assert_eq!(KeywordMode::default(), KeywordMode::Raw);
    }
}
