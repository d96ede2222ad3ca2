use std::path::PathBuf;

use {anyhow::Result, clap::Subcommand, secrecy::Secret};

use skilldeck_config::{
    SkilldeckConfig,
    validate::{self, Severity},
};

use crate::output::Output;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// File to check instead of the discovered one.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Write a config file holding the default settings.
    Init {
        /// Where to write it (defaults to the discovered or user-global path).
        #[arg(long)]
        file: Option<PathBuf>,
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML.
    Show,
    /// Print the config file and directory locations.
    Path,
}

pub fn handle_config(action: ConfigAction, out: Output) -> Result<()> {
    match action {
        ConfigAction::Check { file, verbose } => check(file, verbose, out),
        ConfigAction::Init { file, force } => {
            let path = file.unwrap_or_else(skilldeck_config::find_or_default_config_path);
            skilldeck_config::save_config(&SkilldeckConfig::default(), &path, force)?;
            if out.json {
                return out.data(&serde_json::json!({ "config_file": path }));
            }
            println!("Wrote {}", path.display());
            Ok(())
        },
        ConfigAction::Show => show(out),
        ConfigAction::Path => {
            let config_file = skilldeck_config::find_or_default_config_path();
            let config_dir = skilldeck_config::config_dir();
            let data_dir = skilldeck_config::data_dir();
            if out.json {
                return out.data(&serde_json::json!({
                    "config_file": config_file,
                    "config_dir": config_dir,
                    "data_dir": data_dir,
                }));
            }
            println!("Config file: {}", config_file.display());
            if let Some(dir) = config_dir {
                println!("Config dir:  {}", dir.display());
            }
            println!("Data dir:    {}", data_dir.display());
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(file: Option<PathBuf>, verbose: bool, out: Output) -> Result<()> {
    let result = validate::validate(file.as_deref());
    let errors = result.count(Severity::Error);

    if out.json {
        out.data(&result)?;
        if errors > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let color = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Info => CYAN,
        };

        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{}{RESET} {}", d.severity, d.message);
        } else {
            eprintln!(
                "  {BOLD}{color}{}{RESET} {}: {}",
                d.severity, d.path, d.message
            );
        }
        shown += 1;
    }

    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn show(out: Output) -> Result<()> {
    let config = redacted(skilldeck_config::discover_and_load());
    if out.json {
        return out.data(&config);
    }
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn redacted(mut config: SkilldeckConfig) -> SkilldeckConfig {
    if config.feedback.github_token.is_some() {
        config.feedback.github_token = Some(Secret::new("[REDACTED]".into()));
    }
    config
}
