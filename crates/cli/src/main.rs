mod config_commands;
mod docs_commands;
mod feedback_commands;
mod output;
mod skills_commands;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::output::Output;

#[derive(Parser)]
#[command(
    name = "skilldeck",
    version,
    about = "Maintain AI assistant skill corpora and their documentation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Print results as a JSON envelope `{ "ok": ..., "data": ... }`.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Custom config directory (overrides default ~/.config/skilldeck/).
    #[arg(long, global = true, env = "SKILLDECK_CONFIG_DIR")]
    config_dir: Option<std::path::PathBuf>,
    /// Custom data directory (overrides default ~/.skilldeck/).
    #[arg(long, global = true, env = "SKILLDECK_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Skill discovery, linting and matching.
    Skills {
        #[command(subcommand)]
        action: skills_commands::SkillAction,
    },
    /// Documentation quality, consistency and improvement reports.
    Docs {
        #[command(subcommand)]
        action: docs_commands::DocsAction,
    },
    /// Feedback templates, analysis, progress and changelogs.
    Feedback {
        #[command(subcommand)]
        action: feedback_commands::FeedbackAction,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

/// Logs go to stderr so stdout stays clean for reports and JSON.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "skilldeck starting");

    // Apply directory overrides before loading config
    if let Some(ref dir) = cli.config_dir {
        skilldeck_config::set_config_dir(dir.clone());
    }
    if let Some(ref dir) = cli.data_dir {
        skilldeck_config::set_data_dir(dir.clone());
    }

    let out = Output { json: cli.json };
    let result = run(cli.command, out).await;
    if out.json
        && let Err(ref e) = result
    {
        println!("{}", output::error_envelope(e));
        std::process::exit(1);
    }
    result
}

async fn run(command: Commands, out: Output) -> anyhow::Result<()> {
    match command {
        Commands::Skills { action } => {
            let config = skilldeck_config::discover_and_load();
            skills_commands::handle_skills(action, &config, out).await
        },
        Commands::Docs { action } => {
            let config = skilldeck_config::discover_and_load();
            docs_commands::handle_docs(action, &config.docs, out)
        },
        Commands::Feedback { action } => {
            let config = skilldeck_config::discover_and_load();
            feedback_commands::handle_feedback(action, &config.feedback, out).await
        },
        Commands::Config { action } => config_commands::handle_config(action, out),
    }
}
