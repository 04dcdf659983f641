//! CLI-specific error types and exit code mapping

use logsift_core::error::{LogsiftError, StoreError};
use logsift_engine::EngineError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The rule file could not be read or parsed.
    #[error("rule store error: {0}")]
    Store(#[from] StoreError),

    /// Classification or test run failed inside the engine.
    #[error("engine error: {0}")]
    Engine(String),

    /// At least one decoder failed its integrity tests.
    #[error("{failed} decoder(s) failed integrity tests")]
    TestsFailed { failed: usize },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logsift-core.
    #[error("{0}")]
    Core(#[from] LogsiftError),

    /// Rule file failed validation.
    #[error("rule error: {0}")]
    Rule(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | 0    | Success                               |
    /// | 1    | General / command error               |
    /// | 2    | Configuration error                   |
    /// | 3    | Rule store unavailable or malformed   |
    /// | 4    | Integrity tests found failing decoders |
    /// | 10   | IO error                              |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(LogsiftError::Config(_)) => 2,
            Self::Store(_) | Self::Core(LogsiftError::Store(_)) => 3,
            Self::TestsFailed { .. } => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_)
            | Self::Command(_)
            | Self::Core(_)
            | Self::Engine(_)
            | Self::Rule(_) => 1,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Store(store) => Self::Store(store),
            other => Self::Engine(other.to_string()),
        }
    }
}
