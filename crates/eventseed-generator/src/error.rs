//! Error types for the generator binary.

/// Top-level error for the generator binary.
///
/// Each variant wraps one failure mode, so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: eventseed_core::ConfigError,
    },

    /// The generation run failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: eventseed_core::RunnerError,
    },

    /// The log subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
