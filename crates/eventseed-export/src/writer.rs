//! Rendering record streams to delimited text and persisting them.
//!
//! A table is rendered completely in memory and then written to its
//! destination with a single overwrite. There is no append mode.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::delimiter::Delimiter;
use crate::error::ExportError;

/// Render a header line followed by one line per row.
///
/// Lines end in `\n`. A field is quoted only if it contains the
/// delimiter, a quote or a line break, so a delimiter never appears raw
/// inside a field.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if a row cannot be encoded.
pub fn render_table<T: Serialize>(
    header: &[&str],
    rows: &[T],
    delimiter: Delimiter,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|err| ExportError::from(csv::Error::from(err.into_error())))
}

/// Render a table and overwrite `path` with it.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if rendering fails, or
/// [`ExportError::Io`] if the destination cannot be written.
pub fn write_table<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: &[T],
    delimiter: Delimiter,
) -> Result<usize, ExportError> {
    let bytes = render_table(header, rows, delimiter)?;
    std::fs::write(path, &bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        path = %path.display(),
        rows = rows.len(),
        bytes = bytes.len(),
        "Table written"
    );
    Ok(bytes.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use eventseed_types::EventId;

    use super::*;
    use crate::tables::{KEYWORD_HEADER, KeywordRow, REGISTRATION_HEADER, RegistrationRow};

    fn row(user: &str, id: u32, name: &str) -> RegistrationRow {
        RegistrationRow {
            user_name: user.to_owned(),
            event_id: EventId(id),
            event_name: name.to_owned(),
            start_datetime: NaiveDate::from_ymd_opt(2021, 5, 1)
                .and_then(|d| d.and_hms_opt(10, 0, 0))
                .unwrap(),
        }
    }

    #[test]
    fn header_then_rows_with_comma() {
        let bytes = render_table(
            &REGISTRATION_HEADER,
            &[row("alice", 1, "Test Concert")],
            Delimiter::COMMA,
        )
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "user_name,event_id,event_name,start_datetime\nalice,1,Test Concert,2021-05-01T10:00:00\n"
        );
    }

    #[test]
    fn semicolon_delimiter_applies_to_header_and_rows() {
        let rows = [KeywordRow {
            event_id: EventId(7),
            keyword: "Rock Music".to_owned(),
        }];
        let text = String::from_utf8(render_table(&KEYWORD_HEADER, &rows, Delimiter::SEMICOLON).unwrap())
            .unwrap();
        assert_eq!(text, "event_id;keyword\n7;Rock Music\n");
    }

    #[test]
    fn empty_table_still_has_header() {
        let rows: [KeywordRow; 0] = [];
        let text = String::from_utf8(render_table(&KEYWORD_HEADER, &rows, Delimiter::COMMA).unwrap())
            .unwrap();
        assert_eq!(text, "event_id,keyword\n");
    }

    #[test]
    fn delimiter_inside_field_is_quoted() {
        let text = String::from_utf8(
            render_table(&REGISTRATION_HEADER, &[row("bob", 2, "Rock, Paper")], Delimiter::COMMA)
                .unwrap(),
        )
        .unwrap();
        assert!(text.contains("\"Rock, Paper\""));
    }

    #[test]
    fn write_overwrites_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_keyword.csv");
        std::fs::write(&path, "stale content that is much longer than the table\n").unwrap();

        let rows = [KeywordRow {
            event_id: EventId(1),
            keyword: "live".to_owned(),
        }];
        write_table(&path, &KEYWORD_HEADER, &rows, Delimiter::COMMA).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "event_id,keyword\n1,live\n");
    }

    #[test]
    fn unwritable_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let rows: [KeywordRow; 0] = [];
        let result = write_table(&path, &KEYWORD_HEADER, &rows, Delimiter::COMMA);
        assert!(matches!(result, Err(ExportError::Io { .. })));
    }
}
