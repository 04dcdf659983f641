//! `logsift decode` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::info;

use logsift_core::types::{MatchResult, MatchStatus};
use logsift_engine::{DecoderEngine, YamlRuleStore};

use crate::cli::DecodeArgs;
use crate::commands::{load_config_or_default, resolve_rules_path};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `decode` command.
///
/// Reads the whole input, classifies every non-blank line against the rule
/// file and renders one result per line in input order.
pub async fn execute(
    args: DecodeArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config_or_default(config_path).await?;
    let rules_path = resolve_rules_path(args.rules, &config);

    let raw = read_input(&args.input).await?;
    info!(
        input = %args.input.display(),
        rules = %rules_path.display(),
        bytes = raw.len(),
        "decoding input"
    );

    let engine = DecoderEngine::new(YamlRuleStore::new(rules_path), &config.engine);
    let results = engine.batch_decode(&raw).await?;

    let report = DecodeReport::new(results, args.matched_only);
    writer.render(&report)?;

    Ok(())
}

async fn read_input(input: &Path) -> Result<String, CliError> {
    if input == Path::new("-") {
        let mut raw = String::new();
        tokio::io::stdin().read_to_string(&mut raw).await?;
        return Ok(raw);
    }

    tokio::fs::read_to_string(input).await.map_err(|e| {
        CliError::Command(format!("failed to read '{}': {e}", input.display()))
    })
}

/// Classification results for one input.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeReport {
    /// Non-blank lines classified
    pub total: usize,
    /// Lines that matched a decoder
    pub matched: usize,
    /// Per-line results in input order (filtered with `--matched-only`)
    pub results: Vec<MatchResult>,
}

impl DecodeReport {
    pub fn new(mut results: Vec<MatchResult>, matched_only: bool) -> Self {
        let total = results.len();
        let matched = results.iter().filter(|r| r.is_success()).count();
        if matched_only {
            results.retain(MatchResult::is_success);
        }
        Self {
            total,
            matched,
            results,
        }
    }
}

impl Render for DecodeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for result in &self.results {
            let status = match result.status {
                MatchStatus::Success => result.status.to_string().green().bold(),
                MatchStatus::NoMatch => result.status.to_string().yellow(),
            };
            writeln!(
                w,
                "[{}] {}/{}  {}",
                status,
                result.service_name.bold(),
                result.decoder_name,
                result.log_line.dimmed()
            )?;
            if let Some(fields) = &result.fields {
                for (name, value) in fields {
                    writeln!(w, "    {name} = {value}")?;
                }
            }
        }

        writeln!(w)?;
        writeln!(
            w,
            "{} lines, {} matched, {} unmatched",
            self.total,
            self.matched.to_string().green(),
            self.total - self.matched
        )?;

        Ok(())
    }
}
