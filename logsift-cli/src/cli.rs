//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// logsift -- classify raw log lines with operator-defined decoders.
///
/// Use `logsift <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logsift", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logsift.toml configuration file.
    #[arg(short, long, default_value = "logsift.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify newline-delimited log lines.
    Decode(DecodeArgs),

    /// Run decoder integrity tests against stored fixtures.
    Test(TestArgs),

    /// Inspect and validate rule files.
    Rules(RulesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- decode ----

/// Classify every non-blank line of a file (or stdin).
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input file, `-` reads stdin.
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Rule file (overrides `store.rules_path`).
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Only print lines that matched a decoder.
    #[arg(long)]
    pub matched_only: bool,
}

// ---- test ----

/// Verify decoders against their fixtures.
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Rule file (overrides `store.rules_path`).
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Test a single decoder by id.
    #[arg(long)]
    pub decoder: Option<String>,
}

// ---- rules ----

/// Inspect and validate rule files.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List services and decoders in evaluation order.
    List {
        /// Rule file (defaults to `store.rules_path`).
        path: Option<PathBuf>,
    },
    /// Check schema, compile every pattern and try each decoder's log example.
    Validate {
        /// Rule file (defaults to `store.rules_path`).
        path: Option<PathBuf>,
    },
}

// ---- config ----

/// Manage logsift configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, engine, store, server, metrics).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_decode_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["logsift", "decode"]).expect("parse succeeded");
        match cli.command {
            Commands::Decode(args) => {
                assert_eq!(args.input, PathBuf::from("-"), "input should default to stdin");
                assert!(args.rules.is_none());
                assert!(!args.matched_only);
            }
            _ => panic!("expected Decode command"),
        }
    }

    #[test]
    fn test_cli_parse_decode_with_rules_override() {
        let cli = Cli::try_parse_from([
            "logsift",
            "decode",
            "/var/log/auth.log",
            "--rules",
            "/tmp/rules.yml",
            "--matched-only",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Decode(args) => {
                assert_eq!(args.input, PathBuf::from("/var/log/auth.log"));
                assert_eq!(args.rules, Some(PathBuf::from("/tmp/rules.yml")));
                assert!(args.matched_only);
            }
            _ => panic!("expected Decode command"),
        }
    }

    #[test]
    fn test_cli_parse_test_single_decoder() {
        let cli = Cli::try_parse_from(["logsift", "test", "--decoder", "ssh-failed"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Test(args) => {
                assert_eq!(args.decoder, Some("ssh-failed".to_owned()));
            }
            _ => panic!("expected Test command"),
        }
    }

    #[test]
    fn test_cli_parse_rules_validate_custom_path() {
        let cli = Cli::try_parse_from(["logsift", "rules", "validate", "/custom/rules.yml"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Rules(rules_args) => match rules_args.action {
                RulesAction::Validate { path } => {
                    assert_eq!(path, Some(PathBuf::from("/custom/rules.yml")));
                }
                _ => panic!("expected Validate action"),
            },
            _ => panic!("expected Rules command"),
        }
    }

    #[test]
    fn test_cli_parse_rules_list_without_path() {
        let cli = Cli::try_parse_from(["logsift", "rules", "list"]).expect("parse succeeded");
        match cli.command {
            Commands::Rules(rules_args) => match rules_args.action {
                RulesAction::List { path } => assert!(path.is_none()),
                _ => panic!("expected List action"),
            },
            _ => panic!("expected Rules command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["logsift", "config", "show", "--section", "engine"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Show { section } => {
                    assert_eq!(section, Some("engine".to_owned()));
                }
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "logsift",
            "-c",
            "/etc/logsift/logsift.toml",
            "test",
            "--output",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("/etc/logsift/logsift.toml"));
        assert!(matches!(cli.output, OutputFormat::Json));
        assert_eq!(cli.log_level, Some("debug".to_owned()));
    }

    #[test]
    fn test_cli_parse_missing_command_fails() {
        let args = Cli::try_parse_from(["logsift"]);
        assert!(args.is_err(), "should fail when no command provided");
    }

    #[test]
    fn test_cli_verify_command_structure() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "logsift");

        let subcommands: Vec<_> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        for expected in ["decode", "test", "rules", "config"] {
            assert!(
                subcommands.contains(&expected),
                "should have '{expected}' subcommand"
            );
        }
    }
}
