//! Command handlers -- one module per subcommand

pub mod config;
pub mod decode;
pub mod rules;

use std::path::{Path, PathBuf};

use logsift_core::config::LogsiftConfig;
use tracing::debug;

use crate::error::CliError;

/// Load the configuration for commands that can run without a config file.
///
/// A missing file falls back to defaults plus `LOGSIFT_*` overrides.
/// A file that exists but fails to parse or validate is still an error.
pub(crate) async fn load_config_or_default(config_path: &Path) -> Result<LogsiftConfig, CliError> {
    if tokio::fs::try_exists(config_path).await? {
        return Ok(LogsiftConfig::load(config_path).await?);
    }

    debug!(path = %config_path.display(), "config file not found, using defaults");
    let mut config = LogsiftConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Resolve the rule file: explicit path first, then `store.rules_path`.
pub(crate) fn resolve_rules_path(explicit: Option<PathBuf>, config: &LogsiftConfig) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(&config.store.rules_path))
}
