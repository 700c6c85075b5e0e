//! Event catalog builder.
//!
//! [`CatalogBuilder::create_event`] assigns the next id from the builder's
//! own [`EventIdSequence`], samples a start time from the bucket's window,
//! attaches keywords, and files the event under its category and bucket.
//! Each builder starts counting at 1, so separate runs never leak ids into
//! each other.

use eventseed_types::{Bucket, Event, EventIdSequence, Keyword};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::catalog::EventCatalog;
use crate::definition::CatalogDefinition;
use crate::error::CatalogError;
use crate::keyword::{KeywordCatalog, KeywordMode};
use crate::window::BucketWindows;

/// Incrementally builds an [`EventCatalog`].
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    sequence: EventIdSequence,
    keywords: KeywordCatalog,
    mode: KeywordMode,
    windows: BucketWindows,
    catalog: EventCatalog,
    skipped_keywords: usize,
}

impl CatalogBuilder {
    /// Create a builder with an empty catalog and a fresh id sequence.
    pub const fn new(keywords: KeywordCatalog, mode: KeywordMode, windows: BucketWindows) -> Self {
        Self {
            sequence: EventIdSequence::new(),
            keywords,
            mode,
            windows,
            catalog: EventCatalog::new(),
            skipped_keywords: 0,
        }
    }

    /// Create one event and add it to the catalog.
    ///
    /// In [`KeywordMode::Resolve`], keyword ids missing from the keyword
    /// catalog are skipped with a warning. In [`KeywordMode::Raw`] every
    /// id is attached verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EmptyEventName`] for a blank name, a window
    /// error if the start time cannot be sampled, or
    /// [`CatalogError::IdsExhausted`] once the id sequence has run out.
    /// No id is consumed when an error is returned.
    pub fn create_event<R, S>(
        &mut self,
        rng: &mut R,
        category: &str,
        name: &str,
        bucket: Bucket,
        keyword_ids: &[S],
    ) -> Result<&Event, CatalogError>
    where
        R: Rng + ?Sized,
        S: AsRef<str>,
    {
        if name.trim().is_empty() {
            return Err(CatalogError::EmptyEventName {
                category: category.to_owned(),
            });
        }

        let start = self.windows.for_bucket(bucket).sample(rng)?;
        let id = self.sequence.next().ok_or_else(|| CatalogError::IdsExhausted {
            category: category.to_owned(),
            event: name.to_owned(),
        })?;
        let mut event = Event::new(id, name, start);

        for keyword_id in keyword_ids {
            let keyword_id = keyword_id.as_ref();
            match self.mode {
                KeywordMode::Raw => event.add_keyword(Keyword::new(keyword_id)),
                KeywordMode::Resolve => match self.keywords.resolve(keyword_id) {
                    Some(keyword) => event.add_keyword(keyword.clone()),
                    None => {
                        warn!(
                            event_id = %id,
                            event = name,
                            keyword = keyword_id,
                            "Unknown keyword, skipping"
                        );
                        self.skipped_keywords = self.skipped_keywords.saturating_add(1);
                    }
                },
            }
        }

        debug!(
            event_id = %id,
            category,
            bucket = %bucket,
            start = %start,
            keywords = event.keywords().len(),
            "Created event"
        );

        self.catalog
            .insert(category, bucket, event)
            .ok_or(CatalogError::EventNotStored(id))
    }

    /// Create every event of a catalog definition, category by category,
    /// past bucket before future bucket.
    ///
    /// # Errors
    ///
    /// Propagates the first [`create_event`](Self::create_event) error.
    pub fn add_definition<R: Rng + ?Sized>(
        &mut self,
        definition: &CatalogDefinition,
        rng: &mut R,
    ) -> Result<(), CatalogError> {
        for category in &definition.categories {
            for (bucket, events) in [
                (Bucket::Past, &category.past),
                (Bucket::Future, &category.future),
            ] {
                for event in events {
                    self.create_event(rng, &category.name, &event.name, bucket, &event.keywords)?;
                }
            }
        }
        Ok(())
    }

    /// Number of keyword ids skipped because they could not be resolved.
    pub const fn skipped_keywords(&self) -> usize {
        self.skipped_keywords
    }

    /// The catalog built so far.
    pub const fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Finish building and hand over the catalog.
    pub fn finish(self) -> EventCatalog {
        self.catalog
    }
}

/// Build a full catalog from a definition in one call.
///
/// # Errors
///
/// Propagates any [`CatalogError`] raised while creating events.
pub fn build_catalog<R: Rng + ?Sized>(
    definition: &CatalogDefinition,
    mode: KeywordMode,
    windows: BucketWindows,
    rng: &mut R,
) -> Result<EventCatalog, CatalogError> {
    let mut builder = CatalogBuilder::new(definition.keyword_catalog(), mode, windows);
    builder.add_definition(definition, rng)?;

    info!(
        events = builder.catalog().len(),
        categories = builder.catalog().category_names().len(),
        keyword_edges = builder.catalog().keyword_edge_count(),
        skipped_keywords = builder.skipped_keywords(),
        keyword_mode = ?mode,
        "Event catalog built"
    );

    Ok(builder.finish())
}
