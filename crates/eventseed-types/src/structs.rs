//! Core entity structs: [`Keyword`], [`Event`] and [`User`].
//!
//! Users point at events by [`EventId`]; events never point back at
//! users. The user-to-event link is the only direction of ownership for
//! registration and participation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RelationError;
use crate::ids::EventId;

// ---------------------------------------------------------------------------
// Keyword
// ---------------------------------------------------------------------------

/// A named tag attached to events.
///
/// Keywords are created once from the catalog and never change. Names
/// are not required to be unique.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyword {
    /// Label exported in the keyword table.
    pub name: String,
}

impl Keyword {
    /// Create a keyword with the given label.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl core::fmt::Display for Keyword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A generated event.
///
/// The id is fixed at construction. Keywords keep attachment order and
/// may contain duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    name: String,
    start_datetime: NaiveDateTime,
    keywords: Vec<Keyword>,
}

impl Event {
    /// Create an event with no keywords.
    pub fn new(id: EventId, name: impl Into<String>, start_datetime: NaiveDateTime) -> Self {
        Self {
            id,
            name: name.into(),
            start_datetime,
            keywords: Vec::new(),
        }
    }

    /// Append a keyword.
    pub fn add_keyword(&mut self, keyword: Keyword) {
        self.keywords.push(keyword);
    }

    /// The event id.
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The start time.
    pub const fn start_datetime(&self) -> NaiveDateTime {
        self.start_datetime
    }

    /// Keywords in attachment order.
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    /// Whether the event starts strictly before `as_of`.
    pub fn started_before(&self, as_of: NaiveDateTime) -> bool {
        self.start_datetime < as_of
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A simulated user with registration and participation edges.
///
/// Both collections are ordered by first insertion and hold no
/// duplicates. `participated_in` is always a subset of `registered_to`,
/// and only holds events that started before the as-of time they were
/// evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    name: String,
    registered_to: Vec<EventId>,
    participated_in: Vec<EventId>,
}

/// Tally of a [`User::derive_participation`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipationOutcome {
    /// Events newly added to `participated_in`.
    pub added: usize,
    /// Events that were already recorded as participated.
    pub already_present: usize,
    /// Events rejected by the participation preconditions.
    pub rejected: Vec<RelationError>,
}

impl User {
    /// Create a user with no registrations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registered_to: Vec::new(),
            participated_in: Vec::new(),
        }
    }

    /// The user's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered event ids in registration order.
    pub fn registered_to(&self) -> &[EventId] {
        &self.registered_to
    }

    /// Participated event ids in derivation order.
    pub fn participated_in(&self) -> &[EventId] {
        &self.participated_in
    }

    /// Whether the user is registered to `event`.
    pub fn is_registered_to(&self, event: EventId) -> bool {
        self.registered_to.contains(&event)
    }

    /// Whether the user participated in `event`.
    pub fn has_participated_in(&self, event: EventId) -> bool {
        self.participated_in.contains(&event)
    }

    /// Register the user to an event.
    ///
    /// Idempotent: registering an event twice leaves the collection
    /// unchanged. Returns `true` if the event was newly added.
    pub fn add_registered(&mut self, event: &Event) -> bool {
        if self.is_registered_to(event.id()) {
            return false;
        }
        self.registered_to.push(event.id());
        true
    }

    /// Record that the user participated in an event.
    ///
    /// The event must already be registered and must start strictly
    /// before `as_of`. Returns `Ok(true)` when the edge was added and
    /// `Ok(false)` when it was already present.
    ///
    /// # Errors
    ///
    /// Returns [`RelationError::NotRegistered`] or
    /// [`RelationError::NotYetStarted`] when a precondition fails. The
    /// user is not modified in either case.
    pub fn add_participated(
        &mut self,
        event: &Event,
        as_of: NaiveDateTime,
    ) -> Result<bool, RelationError> {
        if !self.is_registered_to(event.id()) {
            return Err(RelationError::NotRegistered {
                user: self.name.clone(),
                event: event.id(),
            });
        }
        if !event.started_before(as_of) {
            return Err(RelationError::NotYetStarted {
                user: self.name.clone(),
                event: event.id(),
                start: event.start_datetime(),
                as_of,
            });
        }
        if self.has_participated_in(event.id()) {
            return Ok(false);
        }
        self.participated_in.push(event.id());
        Ok(true)
    }

    /// Evaluate every registered event for participation.
    ///
    /// Call this once all registrations for the user are in place.
    /// `lookup` resolves ids against the catalog; ids it cannot resolve
    /// are reported as [`RelationError::UnknownEvent`].
    pub fn derive_participation<'a, F>(
        &mut self,
        lookup: F,
        as_of: NaiveDateTime,
    ) -> ParticipationOutcome
    where
        F: Fn(EventId) -> Option<&'a Event>,
    {
        let mut outcome = ParticipationOutcome::default();
        let registered = self.registered_to.clone();
        for id in registered {
            let Some(event) = lookup(id) else {
                outcome.rejected.push(RelationError::UnknownEvent {
                    user: self.name.clone(),
                    event: id,
                });
                continue;
            };
            match self.add_participated(event, as_of) {
                Ok(true) => outcome.added = outcome.added.saturating_add(1),
                Ok(false) => {
                    outcome.already_present = outcome.already_present.saturating_add(1);
                }
                Err(err) => outcome.rejected.push(err),
            }
        }
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    fn eval_time() -> NaiveDateTime {
        at(2025, 1, 1, 0)
    }

    #[test]
    fn registration_is_idempotent() {
        let event = Event::new(EventId(1), "Test Concert", at(2021, 5, 1, 10));
        let mut user = User::new("Alice");

        assert!(user.add_registered(&event));
        assert!(!user.add_registered(&event));
        assert_eq!(user.registered_to().len(), 1);
    }

    #[test]
    fn registration_keeps_first_seen_order() {
        let a = Event::new(EventId(3), "A", at(2021, 1, 1, 1));
        let b = Event::new(EventId(1), "B", at(2022, 1, 1, 1));
        let mut user = User::new("Alice");
        user.add_registered(&a);
        user.add_registered(&b);
        user.add_registered(&a);
        assert_eq!(user.registered_to(), &[EventId(3), EventId(1)]);
    }

    #[test]
    fn past_registered_event_is_participated_once() {
        let event = Event::new(EventId(1), "Test Concert", at(2021, 5, 1, 10));
        let mut user = User::new("Alice");
        user.add_registered(&event);

        assert_eq!(user.add_participated(&event, eval_time()), Ok(true));
        assert_eq!(user.participated_in(), &[EventId(1)]);

        assert_eq!(user.add_participated(&event, eval_time()), Ok(false));
        assert_eq!(user.participated_in().len(), 1);
    }

    #[test]
    fn future_event_is_rejected() {
        let event = Event::new(EventId(2), "Far Away Fest", at(2030, 1, 1, 0));
        let mut user = User::new("Bob");
        user.add_registered(&event);

        let result = user.add_participated(&event, eval_time());
        assert!(matches!(result, Err(RelationError::NotYetStarted { .. })));
        assert!(user.participated_in().is_empty());
    }

    #[test]
    fn event_starting_exactly_at_as_of_is_rejected() {
        let event = Event::new(EventId(5), "Midnight Gig", eval_time());
        let mut user = User::new("Carol");
        user.add_registered(&event);
        assert!(user.add_participated(&event, eval_time()).is_err());
    }

    #[test]
    fn unregistered_event_is_rejected() {
        let event = Event::new(EventId(4), "Old Match", at(2020, 3, 3, 3));
        let mut user = User::new("Dave");

        let result = user.add_participated(&event, eval_time());
        assert!(matches!(result, Err(RelationError::NotRegistered { .. })));
        assert!(user.participated_in().is_empty());
        assert!(user.registered_to().is_empty());
    }

    #[test]
    fn derive_participation_keeps_subset() {
        let events = [
            Event::new(EventId(1), "Past One", at(2021, 1, 1, 1)),
            Event::new(EventId(2), "Future One", at(2029, 1, 1, 1)),
            Event::new(EventId(3), "Past Two", at(2023, 6, 6, 6)),
        ];
        let mut user = User::new("Erin");
        for event in &events {
            user.add_registered(event);
        }

        let lookup = |id: EventId| events.iter().find(|e| e.id() == id);
        let outcome = user.derive_participation(lookup, eval_time());

        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(user.participated_in(), &[EventId(1), EventId(3)]);
        for id in user.participated_in() {
            assert!(user.is_registered_to(*id));
        }

        let again = user.derive_participation(lookup, eval_time());
        assert_eq!(again.added, 0);
        assert_eq!(again.already_present, 2);
    }

    #[test]
    fn derive_participation_reports_unknown_ids() {
        let known = Event::new(EventId(1), "Known", at(2021, 1, 1, 1));
        let mut user = User::new("Frank");
        user.add_registered(&known);
        user.add_registered(&Event::new(EventId(9), "Ghost", at(2021, 1, 1, 1)));

        let outcome = user.derive_participation(
            |id| if id == known.id() { Some(&known) } else { None },
            eval_time(),
        );
        assert_eq!(outcome.added, 1);
        assert!(matches!(
            outcome.rejected.first(),
            Some(RelationError::UnknownEvent { .. })
        ));
    }

    #[test]
    fn keywords_keep_order_and_duplicates() {
        let mut event = Event::new(EventId(1), "Fest", at(2021, 1, 1, 1));
        event.add_keyword(Keyword::new("live"));
        event.add_keyword(Keyword::new("music"));
        event.add_keyword(Keyword::new("live"));
        let names: Vec<&str> = event.keywords().iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["live", "music", "live"]);
    }
}
