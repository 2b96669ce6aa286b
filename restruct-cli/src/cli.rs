use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Select, Text};
use restruct_core::{
    Clock, Config, ProfileConfig, check, restructure_all,
    restructure::{DEFAULT_TIME_FORMAT, validate_time_format},
    source::{ParsedDocument, load_readings, source_from_arg},
    validate::ensure_valid,
};
use tracing::{debug, info, warn};

use crate::render::{OutputFormat, render_issues, render_readings};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "restruct", version, about = "Flatten provider weather readings")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert raw readings (one object or an array) to the flattened shape.
    Convert {
        /// JSON file to read; stdin when absent or `-`.
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Formatting profile; the configured default when absent.
        #[arg(long, short)]
        profile: Option<String>,

        /// Render timestamps in UTC instead of the reading's local time.
        #[arg(long)]
        utc: bool,

        /// Leave the observation time out of the output.
        #[arg(long)]
        no_time: bool,

        /// Fail on readings that violate expected invariants.
        #[arg(long)]
        strict: bool,

        #[arg(long, short, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Report suspicious values in raw readings.
    Check {
        /// JSON file to read; stdin when absent or `-`.
        #[arg(long, short)]
        input: Option<PathBuf>,
    },

    /// Create or update a formatting profile interactively.
    Configure {
        /// Profile name, e.g. "local" or "utc".
        profile: String,
    },

    /// List configured profiles.
    Profiles,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = self.config;

        match self.command {
            Command::Convert { input, profile, utc, no_time, strict, format } => {
                let config = load_config(config_path.as_deref())?;
                let mut options = config.format_options(profile.as_deref())?;
                if utc {
                    options.clock = Clock::Utc;
                }
                if no_time {
                    options.include_time = false;
                }
                debug!(?options, "resolved format options");

                let source = source_from_arg(input.as_deref());
                let doc = load_readings(&*source).await?;

                screen_readings(&doc, strict)?;

                let normalized = restructure_all(&doc.readings, &options)?;
                println!("{}", render_readings(&normalized, doc.single, format)?);
            }

            Command::Check { input } => {
                let source = source_from_arg(input.as_deref());
                let doc = load_readings(&*source).await?;

                let report = check_document(&doc);
                println!("{}", report.text);
                report.outcome()?;
            }

            Command::Configure { profile } => {
                let mut config = load_config(config_path.as_deref())?;
                let current = config.profile(&profile).cloned().unwrap_or_default();

                let updated = prompt_profile(&profile, &current)?;
                config.upsert_profile(&profile, updated);

                let saved_to = save_config(&config, config_path.as_deref())?;
                info!(profile = %profile, "profile saved");
                println!("Saved profile '{profile}' to {}", saved_to.display());
            }

            Command::Profiles => {
                let config = load_config(config_path.as_deref())?;
                if config.profiles.is_empty() {
                    println!("No profiles configured; built-in defaults are used.");
                    println!("Hint: run `restruct configure <profile>` to create one.");
                    return Ok(());
                }

                let mut names: Vec<_> = config.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker =
                        if config.default_profile_name() == Some(name.as_str()) { "*" } else { " " };
                    let p = &config.profiles[name];
                    println!(
                        "{marker} {name}: format '{}', clock {}, time {}",
                        p.time_format,
                        p.clock,
                        if p.include_time { "on" } else { "off" }
                    );
                }
            }
        }

        Ok(())
    }
}

/// With `strict`, the first reading with issues is an error; otherwise
/// issues are only logged.
fn screen_readings(doc: &ParsedDocument, strict: bool) -> anyhow::Result<()> {
    for raw in &doc.readings {
        if strict {
            ensure_valid(raw)?;
        } else {
            for issue in check(raw) {
                warn!(location = %raw.name, %issue, "suspicious reading");
            }
        }
    }
    Ok(())
}

#[derive(Debug)]
struct CheckReport {
    text: String,
    failing: usize,
    total: usize,
}

impl CheckReport {
    fn outcome(&self) -> anyhow::Result<()> {
        if self.failing > 0 {
            bail!("{} of {} reading(s) have issues", self.failing, self.total);
        }
        Ok(())
    }
}

fn check_document(doc: &ParsedDocument) -> CheckReport {
    let mut failing = 0;
    let mut lines = Vec::with_capacity(doc.readings.len());

    for raw in &doc.readings {
        let issues = check(raw);
        if !issues.is_empty() {
            failing += 1;
        }
        lines.push(render_issues(&raw.name, &issues));
    }

    CheckReport { text: lines.join("\n"), failing, total: doc.readings.len() }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(p) => Config::load_from(p),
        None => Config::load(),
    }
}

fn save_config(config: &Config, path: Option<&Path>) -> anyhow::Result<PathBuf> {
    match path {
        Some(p) => {
            config.save_to(p)?;
            Ok(p.to_path_buf())
        }
        None => config.save(),
    }
}

fn prompt_profile(name: &str, current: &ProfileConfig) -> anyhow::Result<ProfileConfig> {
    println!("Configuring profile: {name}");

    let time_format = Text::new("Time format (chrono strftime):")
        .with_default(&current.time_format)
        .with_help_message(&format!("e.g. {DEFAULT_TIME_FORMAT} or %Y-%m-%d %H:%M"))
        .with_validator(|input: &str| {
            Ok(match validate_time_format(input) {
                Ok(()) => inquire::validator::Validation::Valid,
                Err(e) => inquire::validator::Validation::Invalid(e.to_string().into()),
            })
        })
        .prompt()
        .context("Failed to read time format")?;

    let start = Clock::all().iter().position(|c| *c == current.clock).unwrap_or(0);
    let clock = Select::new("Render timestamps on:", Clock::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read clock")?;

    let include_time = Confirm::new("Include observation time?")
        .with_default(current.include_time)
        .prompt()
        .context("Failed to read include-time choice")?;

    Ok(ProfileConfig { time_format, clock, include_time })
}
