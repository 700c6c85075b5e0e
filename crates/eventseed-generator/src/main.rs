//! Fixture generator binary.
//!
//! Generates a catalog of events with keywords, a population of users
//! registered to those events, and derived participation, then writes
//! them as delimited text tables for seeding a database.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `eventseed-config.yaml` (or `EVENTSEED_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Validate the configuration
//! 4. Run the generation pipeline
//! 5. Log the result

mod error;

use eventseed_core::config::{self, GeneratorConfig, LogFormat, LoggingConfig};
use eventseed_core::runner;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::GeneratorError;

/// Application entry point for the generator.
///
/// # Errors
///
/// Returns an error if configuration, logging setup, or the run fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = config::config_path();
    let config = GeneratorConfig::load_or_default(&config_path).map_err(GeneratorError::from)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("eventseed-generator starting");

    if config_path.exists() {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Validate.
    config.validate().map_err(GeneratorError::from)?;
    info!(
        seed = ?config.generation.seed,
        candidate_names = config.population.candidate_names,
        category_mode = ?config.population.category_mode,
        delimiter = %config.export.delimiter,
        keyword_policy = ?config.export.keyword_policy,
        "Configuration validated"
    );

    // 4. Run.
    let summary = runner::run_generation(&config).map_err(GeneratorError::from)?;

    // 5. Log results.
    runner::log_generation_end(&summary);
    info!("eventseed-generator finished");

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), GeneratorError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_env_err| EnvFilter::try_new(&logging.level))
        .map_err(|e| GeneratorError::Logging {
            message: format!("invalid log level '{}': {e}", logging.level),
        })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = match logging.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| GeneratorError::Logging {
        message: format!("{e}"),
    })
}
