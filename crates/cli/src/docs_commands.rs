//! CLI commands for project documentation.

use std::path::{Path, PathBuf};

use {
    chrono::NaiveDateTime,
    clap::{Args, Subcommand, ValueEnum},
    skilldeck_config::DocsConfig,
    skilldeck_docs::{
        ConsistencyChecker, DocKind, DocScanner, DocsGenerator, GeneratedDoc, QualityAnalyzer,
        QualityReport, suggest,
        report::{
            render_consistency_report, render_generation_summary, render_improvement_plan,
            render_quality_report,
        },
    },
    tracing::debug,
};

use crate::output::Output;

#[derive(Args)]
pub struct DocsTarget {
    /// Project root to inspect.
    #[arg(long, default_value = ".")]
    path: PathBuf,
    /// Write the Markdown report to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
pub struct GenerateOptions {
    /// Directory to write generated documents under (defaults to the project root).
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Replace documents that already exist.
    #[arg(long)]
    force: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GenerateKind {
    Readme,
    Api,
    Architecture,
    All,
}

impl GenerateKind {
    fn kinds(self) -> &'static [DocKind] {
        match self {
            Self::Readme => &[DocKind::Readme],
            Self::Api => &[DocKind::Api],
            Self::Architecture => &[DocKind::Architecture],
            Self::All => &DocKind::ALL,
        }
    }
}

#[derive(Subcommand)]
pub enum DocsAction {
    /// Score documentation quality.
    Analyze(DocsTarget),
    /// Generate README, API and architecture skeletons.
    Generate {
        #[command(flatten)]
        target: DocsTarget,
        #[arg(long, value_enum, default_value = "all")]
        kind: GenerateKind,
        #[command(flatten)]
        options: GenerateOptions,
    },
    /// Check documentation against the code and itself.
    Check(DocsTarget),
    /// Suggest missing documentation.
    Improve(DocsTarget),
    /// Run analyze, generate, check and improve in one report.
    All {
        #[command(flatten)]
        target: DocsTarget,
        #[command(flatten)]
        options: GenerateOptions,
    },
}

pub fn handle_docs(action: DocsAction, config: &DocsConfig, out: Output) -> anyhow::Result<()> {
    let now = chrono::Local::now().naive_local();
    match action {
        DocsAction::Analyze(target) => {
            let report = analyze(&target.path, config)?;
            let md = render_quality_report(&report, &target.path, now);
            out.report(&md, &report, target.output.as_deref())
        },
        DocsAction::Generate {
            target,
            kind,
            options,
        } => {
            let docs = generate(&target.path, kind.kinds(), &options, config, now)?;
            let md = render_generation_summary(&docs);
            out.report(&md, &docs, target.output.as_deref())
        },
        DocsAction::Check(target) => {
            let issues = ConsistencyChecker::new(&target.path, config)?.check_all()?;
            let md = render_consistency_report(&issues);
            out.report(&md, &issues, target.output.as_deref())
        },
        DocsAction::Improve(target) => {
            let plan = suggest(&target.path)?;
            let md = render_improvement_plan(&plan);
            out.report(&md, &plan, target.output.as_deref())
        },
        DocsAction::All { target, options } => {
            let quality = analyze(&target.path, config)?;
            let generated = generate(&target.path, &DocKind::ALL, &options, config, now)?;
            let issues = ConsistencyChecker::new(&target.path, config)?.check_all()?;
            let plan = suggest(&target.path)?;
            let md = [
                render_quality_report(&quality, &target.path, now),
                render_generation_summary(&generated),
                render_consistency_report(&issues),
                render_improvement_plan(&plan),
            ]
            .join("\n---\n\n");
            let data = serde_json::json!({
                "quality": quality,
                "generated": generated,
                "consistency": issues,
                "improvements": plan,
            });
            out.report(&md, &data, target.output.as_deref())
        },
    }
}

fn analyze(root: &Path, config: &DocsConfig) -> anyhow::Result<QualityReport> {
    let files = DocScanner::new(root, config).scan()?;
    debug!(root = %root.display(), files = files.len(), "scanned documentation");
    Ok(QualityAnalyzer::new(root).analyze(&files)?)
}

fn generate(
    root: &Path,
    kinds: &[DocKind],
    options: &GenerateOptions,
    config: &DocsConfig,
    now: NaiveDateTime,
) -> anyhow::Result<Vec<GeneratedDoc>> {
    let generator = DocsGenerator::new(root, config)?;
    Ok(generator.generate(kinds, options.output_dir.as_deref(), options.force, now)?)
}
