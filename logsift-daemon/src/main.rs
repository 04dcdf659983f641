use anyhow::Result;
use clap::Parser;

use logsift_core::config::LogsiftConfig;
use logsift_daemon::cli::DaemonCli;
use logsift_daemon::{logging, metrics_server, server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let config = load_config(&cli).await?;

    if cli.validate {
        println!("configuration is valid: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(config = %cli.config.display(), "logsift-daemon starting");

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    server::serve(&config).await?;

    tracing::info!("logsift-daemon shut down");
    Ok(())
}

/// File, then env overrides, then CLI flags; validated once at the end.
async fn load_config(cli: &DaemonCli) -> Result<LogsiftConfig> {
    let mut config = LogsiftConfig::load(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config: {e}"))?;

    if let Some(level) = &cli.log_level {
        config.general.log_level.clone_from(level);
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format.clone_from(format);
    }
    if let Some(rules) = &cli.rules {
        config.store.rules_path = rules.display().to_string();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {e}"))?;
    Ok(config)
}
