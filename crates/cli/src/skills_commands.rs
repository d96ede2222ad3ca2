//! CLI commands for skill corpora.

use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    clap::Subcommand,
    skilldeck_config::SkilldeckConfig,
    skilldeck_skills::{
        discover::{FsSkillDiscoverer, candidate_dirs},
        lint::{LintReport, LintSeverity, SkillLinter},
        matcher::SkillMatcher,
        registry::{InMemoryRegistry, SkillRegistry},
        types::SkillSource,
    },
};

use crate::output::Output;

#[derive(Subcommand)]
pub enum SkillAction {
    /// List all discovered skills.
    List {
        /// Corpus roots to scan instead of the configured ones.
        #[arg(long = "path")]
        paths: Vec<PathBuf>,
    },
    /// Show details about a skill.
    Info {
        /// Skill name.
        name: String,
        #[arg(long = "path")]
        paths: Vec<PathBuf>,
    },
    /// Check skills for structural problems. Exits with 1 on errors.
    Lint {
        #[arg(long = "path")]
        paths: Vec<PathBuf>,
        /// Re-run whenever a SKILL.md changes.
        #[arg(long)]
        watch: bool,
    },
    /// Rank skills against a task description.
    Match {
        /// Free-text task description.
        task: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        min_score: Option<f64>,
        #[arg(long = "path")]
        paths: Vec<PathBuf>,
    },
}

pub async fn handle_skills(
    action: SkillAction,
    config: &SkilldeckConfig,
    out: Output,
) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match action {
        SkillAction::List { paths } => {
            let registry = load_registry(&cwd, config, &paths).await?;
            let skills = registry.list_skills().await?;
            if out.json {
                return out.data(&skills);
            }
            if skills.is_empty() {
                println!("No skills found.");
            }
            for skill in &skills {
                let source = skill
                    .source
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                println!("  {} — {} [{source}]", skill.name, skill.description);
            }
            Ok(())
        },
        SkillAction::Info { name, paths } => {
            let registry = load_registry(&cwd, config, &paths).await?;
            let content = registry
                .load_skill(&name)
                .await
                .with_context(|| format!("loading skill '{name}'"))?;
            let meta = &content.metadata;
            if out.json {
                return out.data(&serde_json::json!({
                    "metadata": meta,
                    "body": content.body,
                }));
            }
            println!("Name:        {}", meta.name);
            println!("Description: {}", meta.description);
            if let Some(ref version) = meta.version {
                println!("Version:     {version}");
            }
            if let Some(ref license) = meta.license {
                println!("License:     {license}");
            }
            if !meta.allowed_tools.is_empty() {
                println!("Tools:       {}", meta.allowed_tools.join(", "));
            }
            if !meta.tags.is_empty() {
                println!("Tags:        {}", meta.tags.join(", "));
            }
            println!("Path:        {}", meta.path.display());
            if let Some(ref source) = meta.source {
                println!("Source:      {source}");
            }
            println!("\n{}", content.body);
            Ok(())
        },
        SkillAction::Lint { paths, watch } => {
            let roots = corpus_roots(&cwd, config, &paths);
            let linter = SkillLinter::new(config.lint.clone());
            let report = run_lint(&linter, &roots, out)?;
            if watch {
                return watch_lint(&linter, roots, out).await;
            }
            if report.has_errors() {
                std::process::exit(1);
            }
            Ok(())
        },
        SkillAction::Match {
            task,
            limit,
            min_score,
            paths,
        } => {
            let registry = load_registry(&cwd, config, &paths).await?;
            let skills = registry.list_skills().await?;
            let matcher = SkillMatcher::new(
                min_score.unwrap_or(config.matching.min_score),
                limit.unwrap_or(config.matching.limit),
            );
            let matches = matcher.rank(&task, &skills);
            if out.json {
                return out.data(&matches);
            }
            if matches.is_empty() {
                println!("No matching skills.");
            }
            for m in &matches {
                println!(
                    "  {:.2}  {}  ({})",
                    m.score,
                    m.name,
                    m.matched_terms.join(", ")
                );
            }
            Ok(())
        },
    }
}

/// Command-line roots as corpora, else the configured search paths.
fn search_paths(
    cwd: &Path,
    config: &SkilldeckConfig,
    paths: &[PathBuf],
) -> Vec<(PathBuf, SkillSource)> {
    if paths.is_empty() {
        FsSkillDiscoverer::default_paths(cwd, &config.skills)
    } else {
        paths
            .iter()
            .map(|p| (cwd.join(p), SkillSource::Corpus))
            .collect()
    }
}

fn corpus_roots(cwd: &Path, config: &SkilldeckConfig, paths: &[PathBuf]) -> Vec<PathBuf> {
    search_paths(cwd, config, paths)
        .into_iter()
        .map(|(path, _)| path)
        .collect()
}

async fn load_registry(
    cwd: &Path,
    config: &SkilldeckConfig,
    paths: &[PathBuf],
) -> anyhow::Result<InMemoryRegistry> {
    let discoverer = FsSkillDiscoverer::new(search_paths(cwd, config, paths));
    InMemoryRegistry::from_discoverer(&discoverer).await
}

fn run_lint(linter: &SkillLinter, roots: &[PathBuf], out: Output) -> anyhow::Result<LintReport> {
    let dirs: Vec<PathBuf> = roots.iter().flat_map(|root| candidate_dirs(root)).collect();
    let report = linter.lint_corpus(&dirs);
    if out.json {
        out.data(&report)?;
        return Ok(report);
    }
    for finding in &report.findings {
        println!("{finding}");
    }
    println!(
        "{} skill(s) checked: {} error(s), {} warning(s)",
        report.skills_checked,
        report.count(LintSeverity::Error),
        report.count(LintSeverity::Warning)
    );
    Ok(report)
}

#[cfg(feature = "file-watcher")]
async fn watch_lint(linter: &SkillLinter, roots: Vec<PathBuf>, out: Output) -> anyhow::Result<()> {
    use skilldeck_skills::watcher::{SkillWatchEvent, SkillWatcher};

    let (watcher, mut rx) = SkillWatcher::start(roots.clone())?;
    if watcher.watched().is_empty() {
        anyhow::bail!("none of the skill directories exist; nothing to watch");
    }
    eprintln!("Watching for SKILL.md changes (Ctrl-C to stop)...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Some(SkillWatchEvent::Changed { paths }) => {
                    tracing::info!(count = paths.len(), "SKILL.md changed, re-linting");
                    run_lint(linter, &roots, out)?;
                },
                None => break,
            },
        }
    }
    Ok(())
}

#[cfg(not(feature = "file-watcher"))]
async fn watch_lint(_: &SkillLinter, _: Vec<PathBuf>, _: Output) -> anyhow::Result<()> {
    anyhow::bail!("skilldeck was built without the file-watcher feature")
}
