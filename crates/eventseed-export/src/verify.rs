//! Checking written tables against the in-memory model.
//!
//! Each table is read back from disk and compared row by row with what the
//! model flattens to. Registrations must name users that exist and events
//! whose name and start time match the catalog. Keyword links must point at
//! catalog events.

use std::collections::HashSet;
use std::path::Path;

use eventseed_catalog::EventCatalog;
use eventseed_types::User;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::delimiter::Delimiter;
use crate::error::ExportError;
use crate::reader::read_table;
use crate::tables::{
    KEYWORD_HEADER, KeywordExportPolicy, KeywordRow, PARTICIPATION_HEADER, ParticipationRow,
    REGISTRATION_HEADER, RegistrationRow, keyword_rows, participation_rows, registration_rows,
};

fn mismatch(table: &'static str, message: String) -> ExportError {
    ExportError::Verification { table, message }
}

/// Read `path` and require it to equal `expected`, row for row.
fn compare_table<T>(
    table: &'static str,
    path: &Path,
    header: &[&str],
    delimiter: Delimiter,
    expected: &[T],
) -> Result<Vec<T>, ExportError>
where
    T: DeserializeOwned + PartialEq + core::fmt::Debug,
{
    let found: Vec<T> = read_table(path, header, delimiter)?;
    if found.len() != expected.len() {
        return Err(mismatch(
            table,
            format!("expected {} rows, found {}", expected.len(), found.len()),
        ));
    }
    if let Some((line, (want, got))) = expected
        .iter()
        .zip(&found)
        .enumerate()
        .find(|(_, (want, got))| want != got)
    {
        return Err(mismatch(
            table,
            format!("row {} differs: expected {want:?}, found {got:?}", line.saturating_add(1)),
        ));
    }
    debug!(table, rows = found.len(), "Table verified");
    Ok(found)
}

/// Verify the registrations table at `path`.
///
/// # Errors
///
/// Returns [`ExportError::Verification`] on any count, edge, name or
/// start-time disagreement, or a read error from [`read_table`].
pub fn verify_registrations(
    path: &Path,
    delimiter: Delimiter,
    users: &[User],
    catalog: &EventCatalog,
) -> Result<usize, ExportError> {
    const TABLE: &str = "registrations";
    let expected = registration_rows(users, catalog)?;
    let rows: Vec<RegistrationRow> = compare_table(TABLE, path, &REGISTRATION_HEADER, delimiter, &expected)?;

    let names: HashSet<&str> = users.iter().map(User::name).collect();
    for row in &rows {
        if !names.contains(row.user_name.as_str()) {
            return Err(mismatch(TABLE, format!("unknown user '{}'", row.user_name)));
        }
        let event = catalog
            .get(row.event_id)
            .ok_or_else(|| mismatch(TABLE, format!("unknown event {}", row.event_id)))?;
        if event.name() != row.event_name || event.start_datetime() != row.start_datetime {
            return Err(mismatch(
                TABLE,
                format!("event {} does not match the catalog", row.event_id),
            ));
        }
    }
    Ok(rows.len())
}

/// Verify the keyword-links table at `path`.
///
/// # Errors
///
/// Returns [`ExportError::Verification`] if the rows disagree with the
/// policy's flattening or reference an event outside the catalog.
pub fn verify_keywords(
    path: &Path,
    delimiter: Delimiter,
    policy: KeywordExportPolicy,
    users: &[User],
    catalog: &EventCatalog,
) -> Result<usize, ExportError> {
    const TABLE: &str = "keyword links";
    let expected = keyword_rows(policy, users, catalog)?;
    let rows: Vec<KeywordRow> = compare_table(TABLE, path, &KEYWORD_HEADER, delimiter, &expected)?;
    if let Some(row) = rows.iter().find(|row| catalog.get(row.event_id).is_none()) {
        return Err(mismatch(TABLE, format!("unknown event {}", row.event_id)));
    }
    Ok(rows.len())
}

/// Verify the participations table at `path`.
///
/// # Errors
///
/// Returns [`ExportError::Verification`] if the rows disagree with the
/// users' participation sets.
pub fn verify_participations(path: &Path, delimiter: Delimiter, users: &[User]) -> Result<usize, ExportError> {
    let expected = participation_rows(users);
    let rows: Vec<ParticipationRow> =
        compare_table("participations", path, &PARTICIPATION_HEADER, delimiter, &expected)?;
    Ok(rows.len())
}
