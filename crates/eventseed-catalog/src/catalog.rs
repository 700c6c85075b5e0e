//! The built event catalog: events in creation order, grouped by
//! category and bucket.

use std::collections::BTreeMap;

use eventseed_types::{Bucket, Event, EventId};

/// Event ids of one category, split by bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBuckets {
    /// Events created in the past bucket, in creation order.
    pub past: Vec<EventId>,
    /// Events created in the future bucket, in creation order.
    pub future: Vec<EventId>,
}

impl CategoryBuckets {
    /// The ids in the given bucket.
    pub fn bucket(&self, bucket: Bucket) -> &[EventId] {
        match bucket {
            Bucket::Past => &self.past,
            Bucket::Future => &self.future,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<EventId> {
        match bucket {
            Bucket::Past => &mut self.past,
            Bucket::Future => &mut self.future,
        }
    }
}

/// All events of a generation run.
///
/// Events are stored in creation order. Ids come from one sequence, so
/// the id of the n-th event is n.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCatalog {
    events: Vec<Event>,
    categories: BTreeMap<String, CategoryBuckets>,
}

impl EventCatalog {
    /// Create an empty catalog.
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            categories: BTreeMap::new(),
        }
    }

    /// Append an event under `category` / `bucket` and return a reference
    /// to the stored event.
    pub(crate) fn insert(&mut self, category: &str, bucket: Bucket, event: Event) -> Option<&Event> {
        let id = event.id();
        self.categories
            .entry(category.to_owned())
            .or_default()
            .bucket_mut(bucket)
            .push(id);
        self.events.push(event);
        self.events.last()
    }

    /// Look up an event by id.
    pub fn get(&self, id: EventId) -> Option<&Event> {
        let index = usize::try_from(id.into_inner()).ok()?.checked_sub(1)?;
        self.events
            .get(index)
            .filter(|event| event.id() == id)
            .or_else(|| self.events.iter().find(|event| event.id() == id))
    }

    /// The first event, in creation order, with the given display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.name() == name)
    }

    /// All events in creation order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Category names in sorted order.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// The buckets of one category.
    pub fn category(&self, name: &str) -> Option<&CategoryBuckets> {
        self.categories.get(name)
    }

    /// Events of one category bucket, resolved to references.
    pub fn bucket_events(&self, category: &str, bucket: Bucket) -> Vec<&Event> {
        self.category(category)
            .map(|buckets| {
                buckets
                    .bucket(bucket)
                    .iter()
                    .filter_map(|id| self.get(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of (event, keyword) edges over the whole catalog.
    pub fn keyword_edge_count(&self) -> usize {
        self.events.iter().map(|e| e.keywords().len()).sum()
    }
}
