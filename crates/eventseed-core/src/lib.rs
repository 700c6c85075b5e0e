//! Generation pipeline for the eventseed fixture generator.
//!
//! # Modules
//!
//! - [`config`] -- `eventseed-config.yaml` loading and validation
//! - [`names`] -- username sources and de-duplication
//! - [`population`] -- users, registrations and participation
//! - [`runner`] -- one run from configuration to verified output files

pub mod config;
pub mod names;
pub mod population;
pub mod runner;

pub use config::{ConfigError, GeneratorConfig, LogFormat};
pub use names::{FakeUsernames, NameMode, NameSource};
pub use population::{CategoryMode, ParticipationSummary, PopulationError, SamplingSettings};
pub use runner::{GenerationSummary, RunnerError, log_generation_end, run_generation, run_generation_with};
