//! Flattening the relationship model into record streams.
//!
//! | Table | Columns | One row per |
//! |-------|---------|-------------|
//! | registrations | `user_name, event_id, event_name, start_datetime` | registration edge |
//! | keyword links | `event_id, keyword` | event-keyword edge |
//! | participations | `user_name, event_id` | participation edge |
//!
//! Registrations iterate users in creation order, then each user's
//! registrations in insertion order.

use chrono::NaiveDateTime;
use eventseed_catalog::EventCatalog;
use eventseed_types::{Event, EventId, User};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Header of the registrations table.
pub const REGISTRATION_HEADER: [&str; 4] = ["user_name", "event_id", "event_name", "start_datetime"];

/// Header of the keyword-links table.
pub const KEYWORD_HEADER: [&str; 2] = ["event_id", "keyword"];

/// Header of the participations table.
pub const PARTICIPATION_HEADER: [&str; 2] = ["user_name", "event_id"];

/// Which events feed the keyword-links table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordExportPolicy {
    /// Every event of the catalog once, in creation order.
    #[default]
    Catalog,
    /// Every event each user is registered to, user by user. An event
    /// registered by several users repeats its keyword rows.
    Registrations,
}

/// One registration edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRow {
    /// Name of the registered user.
    pub user_name: String,
    /// Id of the event.
    pub event_id: EventId,
    /// Display name of the event.
    pub event_name: String,
    /// Event start time.
    #[serde(with = "iso_datetime")]
    pub start_datetime: NaiveDateTime,
}

/// One event-keyword edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRow {
    /// Id of the event.
    pub event_id: EventId,
    /// Keyword label.
    pub keyword: String,
}

/// One participation edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRow {
    /// Name of the user.
    pub user_name: String,
    /// Id of the event.
    pub event_id: EventId,
}

/// Extended date-time text form used in every table.
pub mod iso_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// `2021-05-01T10:00:00`
    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    /// Serialize a timestamp as `YYYY-MM-DDTHH:MM:SS`.
    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    /// Parse a timestamp written by [`serialize`].
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

fn lookup<'a>(catalog: &'a EventCatalog, user: &User, id: EventId) -> Result<&'a Event, ExportError> {
    catalog.get(id).ok_or_else(|| ExportError::UnknownEvent {
        user: user.name().to_owned(),
        event: id,
    })
}

/// Flatten every registration edge.
///
/// # Errors
///
/// Returns [`ExportError::UnknownEvent`] if a user references an id the
/// catalog does not hold.
pub fn registration_rows(users: &[User], catalog: &EventCatalog) -> Result<Vec<RegistrationRow>, ExportError> {
    let mut rows = Vec::with_capacity(registration_edge_count(users));
    for user in users {
        for &id in user.registered_to() {
            let event = lookup(catalog, user, id)?;
            rows.push(RegistrationRow {
                user_name: user.name().to_owned(),
                event_id: id,
                event_name: event.name().to_owned(),
                start_datetime: event.start_datetime(),
            });
        }
    }
    Ok(rows)
}

/// Flatten event-keyword edges under the given policy.
///
/// # Errors
///
/// Returns [`ExportError::UnknownEvent`] under
/// [`KeywordExportPolicy::Registrations`] if a user references an id the
/// catalog does not hold.
pub fn keyword_rows(
    policy: KeywordExportPolicy,
    users: &[User],
    catalog: &EventCatalog,
) -> Result<Vec<KeywordRow>, ExportError> {
    let mut rows = Vec::new();
    match policy {
        KeywordExportPolicy::Catalog => {
            for event in catalog.events() {
                push_keywords(&mut rows, event);
            }
        }
        KeywordExportPolicy::Registrations => {
            for user in users {
                for &id in user.registered_to() {
                    push_keywords(&mut rows, lookup(catalog, user, id)?);
                }
            }
        }
    }
    Ok(rows)
}

fn push_keywords(rows: &mut Vec<KeywordRow>, event: &Event) {
    rows.extend(event.keywords().iter().map(|keyword| KeywordRow {
        event_id: event.id(),
        keyword: keyword.name.clone(),
    }));
}

/// Flatten every participation edge.
pub fn participation_rows(users: &[User]) -> Vec<ParticipationRow> {
    users
        .iter()
        .flat_map(|user| {
            user.participated_in().iter().map(move |&event_id| ParticipationRow {
                user_name: user.name().to_owned(),
                event_id,
            })
        })
        .collect()
}

/// Total number of registration edges.
pub fn registration_edge_count(users: &[User]) -> usize {
    users.iter().map(|u| u.registered_to().len()).sum()
}

/// Number of keyword-link rows the policy produces.
pub fn keyword_edge_count(policy: KeywordExportPolicy, users: &[User], catalog: &EventCatalog) -> usize {
    match policy {
        KeywordExportPolicy::Catalog => catalog.keyword_edge_count(),
        KeywordExportPolicy::Registrations => users
            .iter()
            .flat_map(User::registered_to)
            .filter_map(|id| catalog.get(*id))
            .map(|event| event.keywords().len())
            .sum(),
    }
}
