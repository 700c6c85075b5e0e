//! Event identifiers and the sequence that hands them out.
//!
//! Event ids are small positive integers assigned in creation order,
//! starting at 1. They are the keys the exported tables use to link
//! registrations and keywords back to events, so they must stay stable
//! for the whole generation run.
//!
//! Ids come from an [`EventIdSequence`] owned by whoever builds the
//! catalog. Two sequences never share state, so independent runs (or
//! tests) always start again at 1.

use serde::{Deserialize, Serialize};

/// Identifier of an event in the generated catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u32);

impl EventId {
    /// Return the inner integer value.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EventId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EventId> for u32 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// Monotonic source of [`EventId`] values.
///
/// The first call to [`next`](Iterator::next) returns `EventId(1)`, and every
/// subsequent call returns the previous value plus one. An id is never
/// handed out twice by the same sequence: once `u32::MAX` has been issued
/// the sequence is exhausted and yields `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIdSequence {
    /// The id the next call will return, or `None` once exhausted.
    next: Option<u32>,
    /// Number of ids handed out so far.
    issued: u32,
}

impl EventIdSequence {
    /// Create a sequence whose first id is 1.
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create a sequence whose first id is `first`.
    pub const fn starting_at(first: u32) -> Self {
        Self {
            next: Some(first),
            issued: 0,
        }
    }

    /// Number of ids handed out so far.
    pub const fn issued(&self) -> u32 {
        self.issued
    }

    /// Whether every id has been handed out.
    pub const fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }
}

impl Default for EventIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for EventIdSequence {
    type Item = EventId;

    /// Hand out the next id and advance the sequence. Returns `None` once
    /// the id space is exhausted.
    fn next(&mut self) -> Option<EventId> {
        let current = self.next?;
        self.next = current.checked_add(1);
        self.issued = self.issued.saturating_add(1);
        Some(EventId(current))
    }
}

impl core::iter::FusedIterator for EventIdSequence {}
