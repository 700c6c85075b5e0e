//! Error types for relationship operations on users.
//!
//! A [`RelationError`] always means the operation was rejected and the
//! user was left exactly as it was before the call.

use chrono::NaiveDateTime;

use crate::ids::EventId;

/// Reasons a participation edge could not be recorded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationError {
    /// The event is not in the user's registration set.
    #[error("event {event} is not in registered_to for user '{user}'")]
    NotRegistered {
        /// Name of the user.
        user: String,
        /// The rejected event.
        event: EventId,
    },

    /// The event has not started yet at the evaluation time.
    #[error("event {event} starts at {start}, not before {as_of}; user '{user}' cannot have participated")]
    NotYetStarted {
        /// Name of the user.
        user: String,
        /// The rejected event.
        event: EventId,
        /// The event's start time.
        start: NaiveDateTime,
        /// The evaluation time the check was made against.
        as_of: NaiveDateTime,
    },

    /// An event id could not be resolved against the catalog.
    #[error("event {event} referenced by user '{user}' is not in the catalog")]
    UnknownEvent {
        /// Name of the user.
        user: String,
        /// The unresolved event id.
        event: EventId,
    },
}
