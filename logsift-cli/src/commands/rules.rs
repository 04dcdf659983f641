//! `logsift rules` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use logsift_engine::{Matcher, PatternCompiler, RegexCompiler, RuleSet, YamlRuleStore};

use crate::cli::{RulesAction, RulesArgs};
use crate::commands::{load_config_or_default, resolve_rules_path};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(
    args: RulesArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        RulesAction::List { path } => execute_list(path, config_path, writer).await,
        RulesAction::Validate { path } => execute_validate(path, config_path, writer).await,
    }
}

async fn execute_list(
    path: Option<PathBuf>,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config_or_default(config_path).await?;
    let rules_path = resolve_rules_path(path, &config);
    info!(path = %rules_path.display(), "listing rules");

    let rules = YamlRuleStore::new(&rules_path).load().await?;
    let report = RuleListReport::from_rules(rules_path.display().to_string(), &rules);
    writer.render(&report)?;

    Ok(())
}

/// Validate a rule file.
///
/// Schema problems and patterns that fail to compile are errors.
/// Decoders that do not match their own `log_example`, services with an empty
/// keyword and decoders without fixtures are reported as warnings only.
async fn execute_validate(
    path: Option<PathBuf>,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config_or_default(config_path).await?;
    let rules_path = resolve_rules_path(path, &config);
    info!(path = %rules_path.display(), "validating rules");

    let source = rules_path.display().to_string();
    let report = match YamlRuleStore::new(&rules_path).load().await {
        Ok(rules) => {
            let compiler = RegexCompiler::from_config(&config.engine);
            let (errors, warnings) = lint_rules(&rules, &compiler);
            RuleValidationReport {
                source,
                valid: errors.is_empty(),
                services: rules.services.len(),
                decoders: rules.decoder_count(),
                errors,
                warnings,
            }
        }
        Err(e) => RuleValidationReport {
            source,
            valid: false,
            services: 0,
            decoders: 0,
            errors: vec![e.to_string()],
            warnings: Vec::new(),
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Rule(format!(
            "{} error(s) in rule file",
            report.errors.len()
        )));
    }

    Ok(())
}

/// Compile every pattern and try each decoder against its own log example.
///
/// Returns `(errors, warnings)`. Inactive rules are checked too so they can be
/// switched on safely.
pub(crate) fn lint_rules<C: PatternCompiler>(
    rules: &RuleSet,
    compiler: &C,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for service in &rules.services {
        if service.prefilter_keyword.is_empty() {
            warnings.push(format!(
                "service '{}': empty prefilter keyword selects every line",
                service.id
            ));
        }

        for decoder in &service.decoders {
            let matcher = match compiler.compile(&decoder.pattern) {
                Ok(matcher) => matcher,
                Err(e) => {
                    errors.push(format!("decoder '{}': {e}", decoder.id));
                    continue;
                }
            };

            if decoder.tests.is_empty() {
                warnings.push(format!("decoder '{}': no test fixtures", decoder.id));
            }

            let Some(example) = decoder.log_example.as_deref() else {
                continue;
            };
            match matcher.try_match(example) {
                Ok(Some(_)) => {}
                Ok(None) => warnings.push(format!(
                    "decoder '{}': pattern does not match its log example",
                    decoder.id
                )),
                Err(e) => warnings.push(format!(
                    "decoder '{}': log example evaluation failed: {e}",
                    decoder.id
                )),
            }
        }
    }

    (errors, warnings)
}

/// Rule listing in evaluation order.
#[derive(Serialize)]
pub struct RuleListReport {
    pub source: String,
    pub services: Vec<ServiceEntry>,
}

#[derive(Serialize)]
pub struct ServiceEntry {
    pub id: String,
    pub name: String,
    pub prefilter_keyword: String,
    pub active: bool,
    pub priority: i32,
    pub decoders: Vec<DecoderEntry>,
}

#[derive(Serialize)]
pub struct DecoderEntry {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub priority: i32,
    pub fixtures: usize,
}

impl RuleListReport {
    /// Build the listing, ordering services and decoders the way the engine evaluates them.
    pub fn from_rules(source: String, rules: &RuleSet) -> Self {
        let mut services: Vec<ServiceEntry> = rules
            .services
            .iter()
            .map(|service| {
                let mut decoders: Vec<DecoderEntry> = service
                    .decoders
                    .iter()
                    .map(|decoder| DecoderEntry {
                        id: decoder.id.clone(),
                        name: decoder.name.clone(),
                        active: decoder.active,
                        priority: decoder.priority,
                        fixtures: decoder.tests.len(),
                    })
                    .collect();
                decoders.sort_by_key(|d| d.priority);

                ServiceEntry {
                    id: service.id.clone(),
                    name: service.name.clone(),
                    prefilter_keyword: service.prefilter_keyword.clone(),
                    active: service.active,
                    priority: service.priority,
                    decoders,
                }
            })
            .collect();
        services.sort_by_key(|s| s.priority);

        Self { source, services }
    }
}

impl Render for RuleListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rules: {}", self.source.bold())?;

        if self.services.is_empty() {
            writeln!(w, "  No services defined.")?;
            return Ok(());
        }

        for service in &self.services {
            let state = if service.active {
                "active".green()
            } else {
                "inactive".dimmed()
            };
            writeln!(w)?;
            writeln!(
                w,
                "{} ({}) keyword={:?} priority={} [{}]",
                service.name.bold(),
                service.id,
                service.prefilter_keyword,
                service.priority,
                state
            )?;

            for decoder in &service.decoders {
                let state = if decoder.active && service.active {
                    "active".green()
                } else {
                    "inactive".dimmed()
                };
                writeln!(
                    w,
                    "  {:<32} {:<24} priority={:<4} fixtures={:<3} [{}]",
                    decoder.id, decoder.name, decoder.priority, decoder.fixtures, state
                )?;
            }
        }

        Ok(())
    }
}

/// Rule file validation result.
#[derive(Serialize)]
pub struct RuleValidationReport {
    pub source: String,
    pub valid: bool,
    pub services: usize,
    pub decoders: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Render for RuleValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rule Validation: {}", self.source.bold())?;
        writeln!(
            w,
            "  Services: {}, Decoders: {}",
            self.services, self.decoders
        )?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
        }
        for err in &self.errors {
            writeln!(w, "  Error: {}", err.red())?;
        }
        for warning in &self.warnings {
            writeln!(w, "  Warning: {}", warning.yellow())?;
        }

        Ok(())
    }
}
