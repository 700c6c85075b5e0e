//! Configuration loading and typed config structures for the generator.
//!
//! The canonical configuration lives in `eventseed-config.yaml` at the
//! project root. Every field has a default, so an empty or missing file
//! yields a complete configuration.
//!
//! Environment variables override the file:
//! - `EVENTSEED_CONFIG` selects the file itself (see [`config_path`])
//! - `EVENTSEED_SEED` overrides `generation.seed`
//!
//! Overrides are applied by the loaders ([`GeneratorConfig::from_file`],
//! [`GeneratorConfig::load_or_default`]). [`GeneratorConfig::parse`] only
//! reads the YAML it is given.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use eventseed_catalog::{BucketWindows, CatalogError, DateWindow, KeywordMode};
use eventseed_export::{Delimiter, ExportTargets, Exporter, KeywordExportPolicy};
use serde::Deserialize;

use crate::names::NameMode;
use crate::population::{CategoryMode, SamplingSettings};

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "eventseed-config.yaml";

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "EVENTSEED_CONFIG";

/// Environment variable overriding `generation.seed`.
pub const SEED_ENV: &str = "EVENTSEED_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The start-time windows are inverted or overlap.
    #[error("invalid catalog windows: {source}")]
    Windows {
        /// The underlying window error.
        #[from]
        source: CatalogError,
    },

    /// The per-user category range is empty or starts at zero.
    #[error("invalid category range: min_categories={min}, max_categories={max}")]
    CategoryRange {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },

    /// Two output tables, or a table and the manifest, share a path.
    #[error("output path {} is configured for more than one file", path.display())]
    DuplicateDestination {
        /// The path named more than once.
        path: PathBuf,
    },

    /// `EVENTSEED_SEED` is set but is not an unsigned integer.
    #[error("EVENTSEED_SEED={value:?} is not a valid seed")]
    SeedOverride {
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Resolve the config file path: `EVENTSEED_CONFIG` if set, otherwise
/// [`DEFAULT_CONFIG_FILE`].
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

/// Top-level generator configuration.
///
/// Mirrors the structure of `eventseed-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeneratorConfig {
    /// Seeding of the run.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Event catalog source and start-time windows.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Population size and sampling parameters.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Output tables and their format.
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GeneratorConfig {
    /// Load configuration from a YAML file at the given path, then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::SeedOverride`] if `EVENTSEED_SEED` is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.generation.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. The environment is not
    /// consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    ///
    /// # Errors
    ///
    /// See [`Self::from_file`].
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.generation.apply_env_overrides()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Windows`] for inverted or overlapping year
    /// windows, [`ConfigError::CategoryRange`] if `min_categories` is
    /// zero or exceeds `max_categories`, or
    /// [`ConfigError::DuplicateDestination`] if two output files share a
    /// path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.catalog.windows()?;
        let (min, max) = (self.population.min_categories, self.population.max_categories);
        if min == 0 || min > max {
            return Err(ConfigError::CategoryRange { min, max });
        }
        self.export.check_destinations()
    }
}

/// Seeding of the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerationConfig {
    /// Seed for the run RNG. When absent, a seed is drawn and logged so
    /// the run can be repeated.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GenerationConfig {
    /// Apply `EVENTSEED_SEED` if set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SeedOverride`] if the value is not a `u64`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(SEED_ENV) {
            let seed = value
                .trim()
                .parse()
                .map_err(|_parse_err| ConfigError::SeedOverride { value: value.clone() })?;
            self.seed = Some(seed);
        }
        Ok(())
    }
}

/// Event catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogConfig {
    /// External catalog YAML. The embedded default is used when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// How event keyword ids become keywords.
    #[serde(default)]
    pub keyword_mode: KeywordMode,

    /// Years past events are drawn from.
    #[serde(default = "default_past_window")]
    pub past_window: DateWindow,

    /// Years future events are drawn from.
    #[serde(default = "default_future_window")]
    pub future_window: DateWindow,
}

impl CatalogConfig {
    /// The validated window pair.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvertedWindow`] or
    /// [`CatalogError::OverlappingWindows`].
    pub const fn windows(&self) -> Result<BucketWindows, CatalogError> {
        BucketWindows::new(self.past_window, self.future_window)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            keyword_mode: KeywordMode::default(),
            past_window: default_past_window(),
            future_window: default_future_window(),
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Number of candidate usernames (`pool`) or exact user count (`exact`).
    #[serde(default = "default_candidate_names")]
    pub candidate_names: u32,

    /// How unique names are obtained.
    #[serde(default)]
    pub name_mode: NameMode,

    /// Fewest categories a user is interested in.
    #[serde(default = "default_min_categories")]
    pub min_categories: u32,

    /// Most categories a user is interested in.
    #[serde(default = "default_max_categories")]
    pub max_categories: u32,

    /// Cap on future events drawn per category.
    #[serde(default = "default_max_future_per_category")]
    pub max_future_per_category: u32,

    /// Whether every chosen category contributes, or only the last.
    #[serde(default)]
    pub category_mode: CategoryMode,

    /// Whether to derive participation edges after registration.
    #[serde(default = "default_true")]
    pub derive_participation: bool,

    /// Evaluation time for participation. Defaults to the wall clock,
    /// read once per run.
    #[serde(default)]
    pub as_of: Option<NaiveDateTime>,
}

impl PopulationConfig {
    /// Sampling parameters for the population simulator.
    pub fn sampling(&self) -> SamplingSettings {
        let to_usize = |value: u32| usize::try_from(value).unwrap_or(usize::MAX);
        SamplingSettings {
            min_categories: to_usize(self.min_categories),
            max_categories: to_usize(self.max_categories),
            max_future_per_category: to_usize(self.max_future_per_category),
            category_mode: self.category_mode,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            candidate_names: default_candidate_names(),
            name_mode: NameMode::default(),
            min_categories: default_min_categories(),
            max_categories: default_max_categories(),
            max_future_per_category: default_max_future_per_category(),
            category_mode: CategoryMode::default(),
            derive_participation: true,
            as_of: None,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportConfig {
    /// Field delimiter shared by every table.
    #[serde(default)]
    pub delimiter: Delimiter,

    /// Registrations table destination.
    #[serde(default = "default_registrations_path")]
    pub registrations_path: PathBuf,

    /// Keyword-links table destination.
    #[serde(default = "default_keywords_path")]
    pub keywords_path: PathBuf,

    /// Which events feed the keyword-links table.
    #[serde(default)]
    pub keyword_policy: KeywordExportPolicy,

    /// Participations table destination; not written when absent.
    #[serde(default)]
    pub participations_path: Option<PathBuf>,

    /// JSON run manifest destination; not written when absent.
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,

    /// Re-read and check every table after writing.
    #[serde(default = "default_true")]
    pub verify: bool,
}

impl ExportConfig {
    /// Table destinations.
    pub fn targets(&self) -> ExportTargets {
        ExportTargets {
            registrations: self.registrations_path.clone(),
            keywords: self.keywords_path.clone(),
            participations: self.participations_path.clone(),
        }
    }

    /// Exporter for this configuration.
    pub const fn exporter(&self) -> Exporter {
        Exporter::new(self.delimiter, self.keyword_policy)
    }

    /// Every configured output path, tables first, then the manifest.
    pub fn destinations(&self) -> Vec<&Path> {
        [
            Some(self.registrations_path.as_path()),
            Some(self.keywords_path.as_path()),
            self.participations_path.as_deref(),
            self.manifest_path.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Reject configurations where one file would overwrite another.
    ///
    /// Paths are compared as written.
    fn check_destinations(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for path in self.destinations() {
            if !seen.insert(path) {
                return Err(ConfigError::DuplicateDestination {
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::default(),
            registrations_path: default_registrations_path(),
            keywords_path: default_keywords_path(),
            keyword_policy: KeywordExportPolicy::default(),
            participations_path: None,
            manifest_path: None,
            verify: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_past_window() -> DateWindow {
    DateWindow::PAST
}

const fn default_future_window() -> DateWindow {
    DateWindow::FUTURE
}

const fn default_candidate_names() -> u32 {
    10_000
}

const fn default_min_categories() -> u32 {
    1
}

const fn default_max_categories() -> u32 {
    3
}

const fn default_max_future_per_category() -> u32 {
    3
}

fn default_registrations_path() -> PathBuf {
    PathBuf::from("user_events.csv")
}

fn default_keywords_path() -> PathBuf {
    PathBuf::from("event_keyword.csv")
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GeneratorConfig::default();
        assert_eq!(config.generation.seed, None);
        assert_eq!(config.population.candidate_names, 10_000);
        assert_eq!(config.population.min_categories, 1);
        assert_eq!(config.population.max_categories, 3);
        assert_eq!(config.population.category_mode, CategoryMode::Union);
        assert_eq!(config.export.delimiter, Delimiter::COMMA);
        assert_eq!(config.export.keyword_policy, KeywordExportPolicy::Catalog);
        assert!(config.export.verify);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
generation:
  seed: 123

catalog:
  keyword_mode: resolve
  past_window: { first_year: 2018, last_year: 2022 }
  future_window: { first_year: 2031, last_year: 2033 }

population:
  candidate_names: 50
  name_mode: exact
  min_categories: 2
  max_categories: 4
  max_future_per_category: 1
  category_mode: last_only
  derive_participation: false
  as_of: "2025-01-01T00:00:00"

export:
  delimiter: ";"
  registrations_path: out/regs.csv
  keywords_path: out/kw.csv
  keyword_policy: registrations
  participations_path: out/parts.csv
  manifest_path: out/manifest.json
  verify: false

logging:
  level: debug
  format: json
"#;

        let config = GeneratorConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.generation.seed, Some(123));
        assert_eq!(config.catalog.keyword_mode, KeywordMode::Resolve);
        assert_eq!(config.catalog.past_window.first_year, 2018);
        assert_eq!(config.population.name_mode, NameMode::Exact);
        assert_eq!(config.population.category_mode, CategoryMode::LastOnly);
        assert!(!config.population.derive_participation);
        assert!(config.population.as_of.is_some());
        assert_eq!(config.export.delimiter, Delimiter::SEMICOLON);
        assert_eq!(config.export.keyword_policy, KeywordExportPolicy::Registrations);
        assert_eq!(config.export.participations_path, Some(PathBuf::from("out/parts.csv")));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "population:\n  candidate_names: 7\n";
        let config = GeneratorConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.population.candidate_names, 7);
        // Everything else uses defaults
        assert_eq!(config.population.max_categories, 3);
        assert_eq!(config.export.registrations_path, PathBuf::from("user_events.csv"));
        assert_eq!(config.catalog.past_window, DateWindow::PAST);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = GeneratorConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn quote_delimiter_rejected_at_parse() {
        let yaml = "export:\n  delimiter: '\"'\n";
        assert!(matches!(GeneratorConfig::parse(yaml), Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn overlapping_windows_rejected() {
        let mut config = GeneratorConfig::default();
        config.catalog.future_window = DateWindow {
            first_year: 2024,
            last_year: 2028,
        };
        assert!(matches!(config.validate(), Err(ConfigError::Windows { .. })));
    }

    #[test]
    fn inverted_window_rejected() {
        let mut config = GeneratorConfig::default();
        config.catalog.past_window = DateWindow {
            first_year: 2024,
            last_year: 2020,
        };
        assert!(matches!(config.validate(), Err(ConfigError::Windows { .. })));
    }

    #[test]
    fn bad_category_ranges_rejected() {
        let mut config = GeneratorConfig::default();
        config.population.min_categories = 0;
        assert!(matches!(config.validate(), Err(ConfigError::CategoryRange { .. })));

        config.population.min_categories = 4;
        config.population.max_categories = 2;
        assert!(matches!(config.validate(), Err(ConfigError::CategoryRange { min: 4, max: 2 })));
    }

    #[test]
    fn duplicate_destinations_rejected() {
        let mut config = GeneratorConfig::default();
        config.export.registrations_path = PathBuf::from("out.csv");
        config.export.keywords_path = PathBuf::from("out.csv");
        config.export.verify = false;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateDestination { ref path }) if path == Path::new("out.csv")
        ));

        let mut config = GeneratorConfig::default();
        config.export.participations_path = Some(PathBuf::from("user_events.csv"));
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateDestination { .. })));

        let mut config = GeneratorConfig::default();
        config.export.participations_path = Some(PathBuf::from("parts.csv"));
        config.export.manifest_path = Some(PathBuf::from("parts.csv"));
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateDestination { .. })));

        config.export.manifest_path = Some(PathBuf::from("manifest.json"));
        assert!(config.validate().is_ok());
        assert_eq!(config.export.destinations().len(), 4);
    }

    #[test]
    fn parse_reads_only_the_yaml() {
        let with_seed = GeneratorConfig::parse("generation:\n  seed: 7\n");
        assert_eq!(with_seed.ok().and_then(|c| c.generation.seed), Some(7));

        let without_seed = GeneratorConfig::parse("");
        assert_eq!(without_seed.ok().map(|c| c.generation.seed), Some(None));
    }

    #[test]
    fn export_targets_follow_paths() {
        let config = GeneratorConfig::default();
        let targets = config.export.targets();
        assert_eq!(targets.registrations, PathBuf::from("user_events.csv"));
        assert_eq!(targets.keywords, PathBuf::from("event_keyword.csv"));
        assert_eq!(targets.participations, None);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            let config = GeneratorConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            if let Ok(config) = config {
                assert!(config.validate().is_ok());
            }
        }
    }
}
