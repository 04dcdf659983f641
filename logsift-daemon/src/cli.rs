//! CLI argument definitions for logsift-daemon.

use std::path::PathBuf;

use clap::Parser;

/// logsift HTTP daemon.
///
/// Serves batch decode and decoder integrity tests over HTTP, reading rules
/// from the configured rule file on every request.
#[derive(Parser, Debug)]
#[command(name = "logsift-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logsift.toml configuration file.
    #[arg(short, long, default_value = "/etc/logsift/logsift.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the rule file path (`store.rules_path`).
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Override the HTTP listen port (`server.port`).
    #[arg(long)]
    pub port: Option<u16>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}
