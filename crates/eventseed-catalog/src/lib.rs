//! Keyword catalog, start-time windows, and the event catalog builder.
//!
//! # Modules
//!
//! - [`definition`] -- catalog documents (keyword labels, categories,
//!   events, scripted users) and the embedded default catalog.
//! - [`keyword`] -- [`KeywordCatalog`] and [`KeywordMode`].
//! - [`window`] -- past/future year windows and start-time sampling.
//! - [`builder`] -- [`CatalogBuilder`] with its own id sequence.
//! - [`catalog`] -- the built [`EventCatalog`].
//! - [`error`] -- [`CatalogError`].

pub mod builder;
pub mod catalog;
pub mod definition;
pub mod error;
pub mod keyword;
pub mod window;

pub use builder::{CatalogBuilder, build_catalog};
pub use catalog::{CategoryBuckets, EventCatalog};
pub use definition::{
    CatalogDefinition, CategoryDefinition, DEFAULT_CATALOG_YAML, EventDefinition, UserDefinition,
};
pub use error::CatalogError;
pub use keyword::{KeywordCatalog, KeywordMode};
pub use window::{BucketWindows, DateWindow};
