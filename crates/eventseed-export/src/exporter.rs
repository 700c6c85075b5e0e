//! One export pass over a finished population.

use std::path::PathBuf;

use eventseed_catalog::EventCatalog;
use eventseed_types::User;
use serde::Serialize;
use tracing::info;

use crate::delimiter::Delimiter;
use crate::error::ExportError;
use crate::tables::{
    KEYWORD_HEADER, KeywordExportPolicy, PARTICIPATION_HEADER, REGISTRATION_HEADER, keyword_rows,
    participation_rows, registration_rows,
};
use crate::verify::{verify_keywords, verify_participations, verify_registrations};
use crate::writer::write_table;

/// Where each table goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTargets {
    /// Registrations table.
    pub registrations: PathBuf,
    /// Keyword-links table.
    pub keywords: PathBuf,
    /// Participations table, if it should be written at all.
    pub participations: Option<PathBuf>,
}

/// Row counts of one export pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Registration rows written.
    pub registration_rows: usize,
    /// Keyword-link rows written.
    pub keyword_rows: usize,
    /// Participation rows written, if that table was requested.
    pub participation_rows: Option<usize>,
}

/// Writes (and optionally re-reads) the tables of one population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exporter {
    delimiter: Delimiter,
    policy: KeywordExportPolicy,
}

impl Exporter {
    /// Create an exporter.
    pub const fn new(delimiter: Delimiter, policy: KeywordExportPolicy) -> Self {
        Self { delimiter, policy }
    }

    /// Delimiter shared by every table.
    pub const fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// Keyword-link policy.
    pub const fn policy(&self) -> KeywordExportPolicy {
        self.policy
    }

    /// Write every requested table, overwriting existing files.
    ///
    /// # Errors
    ///
    /// Returns the first flattening or write error.
    pub fn export(
        &self,
        users: &[User],
        catalog: &EventCatalog,
        targets: &ExportTargets,
    ) -> Result<ExportReport, ExportError> {
        let registrations = registration_rows(users, catalog)?;
        write_table(&targets.registrations, &REGISTRATION_HEADER, &registrations, self.delimiter)?;

        let keywords = keyword_rows(self.policy, users, catalog)?;
        write_table(&targets.keywords, &KEYWORD_HEADER, &keywords, self.delimiter)?;

        let participation_count = match &targets.participations {
            Some(path) => {
                let rows = participation_rows(users);
                write_table(path, &PARTICIPATION_HEADER, &rows, self.delimiter)?;
                Some(rows.len())
            }
            None => None,
        };

        let report = ExportReport {
            registration_rows: registrations.len(),
            keyword_rows: keywords.len(),
            participation_rows: participation_count,
        };
        info!(
            delimiter = %self.delimiter,
            policy = ?self.policy,
            registrations = report.registration_rows,
            keyword_links = report.keyword_rows,
            participations = ?report.participation_rows,
            "Export complete"
        );
        Ok(report)
    }

    /// Re-read every table written by [`Self::export`] and check it.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Verification`] or a read error for the first
    /// table that does not check out.
    pub fn verify(&self, users: &[User], catalog: &EventCatalog, targets: &ExportTargets) -> Result<(), ExportError> {
        verify_registrations(&targets.registrations, self.delimiter, users, catalog)?;
        verify_keywords(&targets.keywords, self.delimiter, self.policy, users, catalog)?;
        if let Some(path) = &targets.participations {
            verify_participations(path, self.delimiter, users)?;
        }
        info!("Exported tables verified");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tables::tests::fixture;

    fn targets(dir: &std::path::Path, participations: bool) -> ExportTargets {
        ExportTargets {
            registrations: dir.join("user_events.csv"),
            keywords: dir.join("event_keyword.csv"),
            participations: participations.then(|| dir.join("user_participations.csv")),
        }
    }

    #[test]
    fn export_then_verify() {
        let (catalog, users) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let targets = targets(dir.path(), true);
        let exporter = Exporter::default();

        let report = exporter.export(&users, &catalog, &targets).unwrap();
        assert_eq!(report.registration_rows, 4);
        assert_eq!(report.keyword_rows, 6);
        assert_eq!(report.participation_rows, Some(2));
        exporter.verify(&users, &catalog, &targets).unwrap();
    }

    #[test]
    fn participations_skipped_when_not_targeted() {
        let (catalog, users) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let targets = targets(dir.path(), false);

        let report = Exporter::default().export(&users, &catalog, &targets).unwrap();
        assert_eq!(report.participation_rows, None);
        assert!(!dir.path().join("user_participations.csv").exists());
    }

    #[test]
    fn semicolon_export_writes_semicolons() {
        let (catalog, users) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let targets = targets(dir.path(), false);
        let exporter = Exporter::new(Delimiter::SEMICOLON, KeywordExportPolicy::Catalog);

        exporter.export(&users, &catalog, &targets).unwrap();
        let text = std::fs::read_to_string(&targets.registrations).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("user_name;event_id;event_name;start_datetime"));
        assert!(lines.all(|line| line.split(';').count() == 4));
        exporter.verify(&users, &catalog, &targets).unwrap();
    }

    #[test]
    fn empty_population_writes_headers_only() {
        let (catalog, _users) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let targets = targets(dir.path(), false);
        let exporter = Exporter::new(Delimiter::COMMA, KeywordExportPolicy::Registrations);

        let report = exporter.export(&[], &catalog, &targets).unwrap();
        assert_eq!(report.registration_rows, 0);
        assert_eq!(report.keyword_rows, 0);
        assert_eq!(
            std::fs::read_to_string(&targets.registrations).unwrap(),
            "user_name,event_id,event_name,start_datetime\n"
        );
        exporter.verify(&[], &catalog, &targets).unwrap();
    }
}
