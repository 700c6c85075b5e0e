//! Delimited-text export of the event fixture model.
//!
//! The relationship model is flattened into record streams ([`tables`]),
//! rendered with one delimiter per export ([`writer`]), and optionally read
//! back and checked against the model ([`reader`], [`verify`]).

pub mod delimiter;
pub mod error;
pub mod exporter;
pub mod reader;
pub mod tables;
pub mod verify;
pub mod writer;

pub use delimiter::Delimiter;
pub use error::ExportError;
pub use exporter::{ExportReport, ExportTargets, Exporter};
pub use tables::{
    KEYWORD_HEADER, KeywordExportPolicy, KeywordRow, PARTICIPATION_HEADER, ParticipationRow,
    REGISTRATION_HEADER, RegistrationRow,
};
