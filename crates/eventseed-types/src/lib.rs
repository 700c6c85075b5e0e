//! Shared type definitions for the eventseed fixture generator.
//!
//! Every other crate in the workspace builds on these types: the catalog
//! crate creates [`Event`]s, the core crate links them to [`User`]s, and
//! the export crate flattens both into delimited tables.
//!
//! # Modules
//!
//! - [`ids`] -- [`EventId`] and the [`EventIdSequence`] that assigns it
//! - [`enums`] -- the [`Bucket`] an event's start time is drawn from
//! - [`structs`] -- [`Keyword`], [`Event`], [`User`]
//! - [`error`] -- [`RelationError`] for rejected participation edges

pub mod enums;
pub mod error;
pub mod ids;
pub mod structs;

pub use enums::Bucket;
pub use error::RelationError;
pub use ids::{EventId, EventIdSequence};
pub use structs::{Event, Keyword, ParticipationOutcome, User};
