//! One generation run, from configuration to verified output files.
//!
//! [`run_generation`] drives the pipeline in a fixed order, all from one
//! seeded RNG:
//!
//! 1. Load the catalog definition and build the event catalog
//! 2. Register the scripted users of the definition
//! 3. Draw unique usernames and simulate their registrations
//! 4. Derive participation against a single as-of time
//! 5. Write the tables and re-read them for verification
//! 6. Write the optional JSON manifest
//!
//! Given the same seed, as-of time and catalog, two runs write identical
//! files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use eventseed_catalog::{CatalogDefinition, CatalogError, KeywordMode, build_catalog};
use eventseed_export::{Delimiter, ExportError, ExportReport, ExportTargets, KeywordExportPolicy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ConfigError, GeneratorConfig};
use crate::names::{FakeUsernames, NameMode, NameSource, draw_unique_names};
use crate::population::{
    CategoryMode, ParticipationSummary, PopulationError, category_reach, derive_participation, populate,
    scripted_users,
};

/// Errors that can occur during a generation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The configuration failed validation.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The catalog could not be loaded or built.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: CatalogError,
    },

    /// The population could not be built.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: PopulationError,
    },

    /// Writing or verifying a table failed.
    #[error("export error: {source}")]
    Export {
        /// The underlying export error.
        #[from]
        source: ExportError,
    },

    /// The manifest could not be encoded.
    #[error("manifest encoding error: {source}")]
    ManifestEncode {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The manifest could not be written.
    #[error("failed to write manifest {path}: {source}")]
    ManifestWrite {
        /// Manifest destination.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Everything a run produced, also written as the JSON manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    /// Seed of the run RNG.
    pub seed: u64,
    /// Catalog file, or `None` for the embedded catalog.
    pub catalog_path: Option<PathBuf>,
    /// Keyword attachment mode.
    pub keyword_mode: KeywordMode,
    /// Events in the catalog.
    pub events: usize,
    /// Categories in the catalog.
    pub categories: usize,
    /// Username mode.
    pub name_mode: NameMode,
    /// Users created, scripted ones included.
    pub users: usize,
    /// Users taken from the catalog document.
    pub scripted_users: usize,
    /// Category accumulation mode.
    pub category_mode: CategoryMode,
    /// Registration edges.
    pub registrations: usize,
    /// Users registered to at least one event of each category.
    pub category_reach: BTreeMap<String, usize>,
    /// Participation totals, when participation was derived.
    pub participation: Option<ParticipationSummary>,
    /// Field delimiter.
    pub delimiter: Delimiter,
    /// Keyword-link policy.
    pub keyword_policy: KeywordExportPolicy,
    /// Table destinations.
    pub outputs: ExportTargets,
    /// Rows written per table.
    pub rows: ExportReport,
    /// Whether the tables were re-read and checked.
    pub verified: bool,
}

/// Run the generator with `fake` usernames.
///
/// # Errors
///
/// See [`run_generation_with`].
pub fn run_generation(config: &GeneratorConfig) -> Result<GenerationSummary, RunnerError> {
    run_generation_with(config, &mut FakeUsernames)
}

/// Run the generator with the given name source.
///
/// The seed comes from `generation.seed` or is drawn from the thread RNG
/// and logged. The as-of time comes from `population.as_of` or is read
/// from the local clock once.
///
/// # Errors
///
/// Returns [`RunnerError`] if the configuration is invalid, the catalog
/// cannot be built, names run out, or any output cannot be written or
/// verified.
pub fn run_generation_with<S>(config: &GeneratorConfig, names: &mut S) -> Result<GenerationSummary, RunnerError>
where
    S: NameSource + ?Sized,
{
    config.validate()?;

    let seed = config.generation.seed.unwrap_or_else(|| {
        let drawn: u64 = rand::rng().random();
        info!(seed = drawn, "No seed configured, drew one");
        drawn
    });
    let mut rng = StdRng::seed_from_u64(seed);

    let definition = match &config.catalog.path {
        Some(path) => CatalogDefinition::from_file(path)?,
        None => CatalogDefinition::embedded()?,
    };
    let source = config
        .catalog
        .path
        .as_deref()
        .map_or_else(|| "embedded".to_owned(), |path| path.display().to_string());
    info!(
        source = %source,
        categories = definition.categories.len(),
        events = definition.event_count(),
        "Catalog definition loaded"
    );
    let catalog = build_catalog(
        &definition,
        config.catalog.keyword_mode,
        config.catalog.windows()?,
        &mut rng,
    )?;

    let mut users = scripted_users(&catalog, &definition.users)?;
    let scripted = users.len();

    let population = &config.population;
    let requested = usize::try_from(population.candidate_names).unwrap_or(usize::MAX);
    let mut user_names = draw_unique_names(names, &mut rng, requested, population.name_mode)?;
    let drawn = user_names.len();
    user_names.retain(|name| !definition.users.iter().any(|u| u.name == *name));
    if user_names.len() < drawn {
        debug!(
            dropped = drawn.saturating_sub(user_names.len()),
            "Sampled names collide with scripted users, dropped"
        );
    }
    users.extend(populate(&catalog, user_names, &population.sampling(), &mut rng)?);

    let participation = population.derive_participation.then(|| {
        let as_of = population.as_of.unwrap_or_else(now);
        derive_participation(&mut users, &catalog, as_of)
    });

    let exporter = config.export.exporter();
    let targets = config.export.targets();
    let rows = exporter.export(&users, &catalog, &targets)?;
    if config.export.verify {
        exporter.verify(&users, &catalog, &targets)?;
    }

    let summary = GenerationSummary {
        seed,
        catalog_path: config.catalog.path.clone(),
        keyword_mode: config.catalog.keyword_mode,
        events: catalog.len(),
        categories: catalog.category_names().len(),
        name_mode: population.name_mode,
        users: users.len(),
        scripted_users: scripted,
        category_mode: population.category_mode,
        registrations: rows.registration_rows,
        category_reach: category_reach(&users, &catalog),
        participation,
        delimiter: exporter.delimiter(),
        keyword_policy: exporter.policy(),
        outputs: targets,
        rows,
        verified: config.export.verify,
    };

    if let Some(path) = &config.export.manifest_path {
        write_manifest(path, &summary)?;
    }

    Ok(summary)
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Write `summary` as pretty JSON.
///
/// # Errors
///
/// Returns [`RunnerError::ManifestEncode`] or [`RunnerError::ManifestWrite`].
pub fn write_manifest(path: &Path, summary: &GenerationSummary) -> Result<(), RunnerError> {
    let mut bytes = serde_json::to_vec_pretty(summary)?;
    bytes.push(b'\n');
    std::fs::write(path, bytes).map_err(|source| RunnerError::ManifestWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Manifest written");
    Ok(())
}

/// Log the final summary of a run.
pub fn log_generation_end(summary: &GenerationSummary) {
    info!(
        seed = summary.seed,
        events = summary.events,
        categories = summary.categories,
        users = summary.users,
        scripted_users = summary.scripted_users,
        registrations = summary.registrations,
        keyword_links = summary.rows.keyword_rows,
        participations = summary.participation.map(|p| p.added),
        verified = summary.verified,
        registrations_path = %summary.outputs.registrations.display(),
        keywords_path = %summary.outputs.keywords.display(),
        "Generation complete"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::RngCore;

    use super::*;

    fn config_in(dir: &Path) -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        config.generation.seed = Some(7);
        config.population.candidate_names = 40;
        config.population.as_of = NaiveDateTime::parse_from_str("2025-06-01T12:00:00", "%Y-%m-%dT%H:%M:%S").ok();
        config.export.registrations_path = dir.join("user_events.csv");
        config.export.keywords_path = dir.join("event_keyword.csv");
        config
    }

    fn numbered() -> impl FnMut(&mut dyn RngCore) -> String {
        let mut next: u32 = 0;
        move |_rng: &mut dyn RngCore| {
            next = next.wrapping_add(1);
            format!("user{next}")
        }
    }

    #[test]
    fn run_writes_and_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let summary = run_generation_with(&config, &mut numbered()).unwrap();

        assert_eq!(summary.seed, 7);
        assert_eq!(summary.users, 40);
        assert_eq!(summary.events, 331);
        assert!(summary.verified);
        assert!(summary.registrations >= 40);
        assert_eq!(summary.rows.registration_rows, summary.registrations);
        assert_eq!(summary.category_reach.len(), summary.categories);
        assert!(summary.participation.is_some_and(|p| p.other_rejections == 0));

        let text = std::fs::read_to_string(dir.path().join("user_events.csv")).unwrap();
        assert_eq!(text.lines().count(), summary.registrations + 1);
    }

    #[test]
    fn participation_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.population.derive_participation = false;
        let summary = run_generation_with(&config, &mut numbered()).unwrap();
        assert_eq!(summary.participation, None);
    }

    #[test]
    fn invalid_config_stops_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.population.min_categories = 0;
        let result = run_generation_with(&config, &mut numbered());
        assert!(matches!(result, Err(RunnerError::Config { .. })));
        assert!(!dir.path().join("user_events.csv").exists());
    }

    #[test]
    fn clashing_destinations_stop_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        let shared = dir.path().join("out.csv");
        config.export.registrations_path = shared.clone();
        config.export.keywords_path = shared.clone();
        config.export.verify = false;

        let result = run_generation_with(&config, &mut numbered());
        assert!(matches!(
            result,
            Err(RunnerError::Config {
                source: ConfigError::DuplicateDestination { .. }
            })
        ));
        assert!(!shared.exists());
    }

    #[test]
    fn manifest_is_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        let manifest = dir.path().join("manifest.json");
        config.export.manifest_path = Some(manifest.clone());
        let summary = run_generation_with(&config, &mut numbered()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&std::fs::read(&manifest).unwrap()).unwrap();
        assert_eq!(value["seed"], 7);
        assert_eq!(value["users"], 40);
        assert_eq!(value["delimiter"], ",");
        assert_eq!(value["keyword_policy"], "catalog");
        assert_eq!(value["rows"]["registration_rows"], summary.registrations);
    }
}
