//! Catalog definition documents.
//!
//! A definition is pure data: a map of keyword ids to labels, an ordered
//! list of categories, each holding past and future event definitions,
//! and an optional list of scripted users who register to events by
//! name. The builder turns the categories into concrete events; scripted
//! users are registered once the catalog exists.
//!
//! The default definition is compiled into the binary from
//! `data/default-catalog.yaml`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::keyword::KeywordCatalog;

/// The catalog shipped with the generator.
pub const DEFAULT_CATALOG_YAML: &str = include_str!("../data/default-catalog.yaml");

/// A whole catalog document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogDefinition {
    /// Keyword id to display label.
    #[serde(default)]
    pub keywords: BTreeMap<String, String>,

    /// Categories in creation order.
    #[serde(default)]
    pub categories: Vec<CategoryDefinition>,

    /// Hand-written users, registered ahead of the sampled population.
    #[serde(default)]
    pub users: Vec<UserDefinition>,
}

/// One category with its two buckets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryDefinition {
    /// Category key, e.g. `rock_concerts`.
    pub name: String,

    /// Events whose start time is drawn from the past window.
    #[serde(default)]
    pub past: Vec<EventDefinition>,

    /// Events whose start time is drawn from the future window.
    #[serde(default)]
    pub future: Vec<EventDefinition>,
}

/// One event to create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventDefinition {
    /// Display name.
    pub name: String,

    /// Keyword ids in attachment order.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A user with a fixed set of registrations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserDefinition {
    /// Username.
    pub name: String,

    /// Event display names, in registration order.
    #[serde(default)]
    pub registered_to: Vec<String>,
}

impl CatalogDefinition {
    /// The embedded default catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Yaml`] if the embedded document fails to
    /// parse.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::parse(DEFAULT_CATALOG_YAML)
    }

    /// Load a catalog document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, or
    /// [`CatalogError::Yaml`] if its content does not parse.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse a catalog document from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Yaml`] if the string does not parse.
    pub fn parse(yaml: &str) -> Result<Self, CatalogError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// The keyword catalog described by this document.
    pub fn keyword_catalog(&self) -> KeywordCatalog {
        KeywordCatalog::from_labels(
            self.keywords
                .iter()
                .map(|(id, label)| (id.clone(), label.clone())),
        )
    }

    /// Total number of event definitions across all categories.
    pub fn event_count(&self) -> usize {
        self.categories
            .iter()
            .map(|c| c.past.len().saturating_add(c.future.len()))
            .sum()
    }
}
