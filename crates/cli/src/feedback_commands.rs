//! CLI commands for the feedback loop.

use std::path::PathBuf;

use {
    anyhow::Context,
    clap::Subcommand,
    secrecy::Secret,
    skilldeck_config::FeedbackConfig,
    skilldeck_feedback::{
        ChangelogEntries, FeedbackStats, GithubClient, IssueBuckets, PlanProgress, load_records,
        load_sources, prepend_to_changelog, render_changelog_section, render_feedback_report,
        render_feedback_template, render_issues_report, render_progress_report,
    },
};

use crate::output::Output;

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// Print a feedback collection template for a skill.
    Template {
        #[arg(long)]
        skill: String,
        #[arg(long, default_value = "v1.0")]
        version: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Summarise feedback files.
    Analyze {
        #[arg(long, num_args = 1.., required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Report checklist progress of an improvement plan.
    Progress {
        #[arg(long)]
        plan: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Build a changelog section from change records.
    Changelog {
        #[arg(long)]
        version: String,
        #[arg(long, num_args = 1..)]
        records: Vec<PathBuf>,
        /// Changelog file; with `--prepend` the section is inserted into it.
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, requires = "output")]
        prepend: bool,
    },
    /// Summarise a repository's GitHub issues.
    Github {
        /// Repository as `owner/name`.
        #[arg(long)]
        repo: String,
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub async fn handle_feedback(
    action: FeedbackAction,
    config: &FeedbackConfig,
    out: Output,
) -> anyhow::Result<()> {
    let now = chrono::Local::now().naive_local();
    match action {
        FeedbackAction::Template {
            skill,
            version,
            output,
        } => {
            let md = render_feedback_template(&skill, &version, now);
            let data = serde_json::json!({ "skill": skill, "version": version, "template": md });
            out.report(&md, &data, output.as_deref())
        },
        FeedbackAction::Analyze { files, output } => {
            let sources = load_sources(&files);
            if sources.is_empty() {
                anyhow::bail!("none of the {} feedback file(s) could be read", files.len());
            }
            let stats = FeedbackStats::from_sources(&sources);
            let md = render_feedback_report(&stats, &sources, now);
            let data = serde_json::json!({ "stats": stats, "findings": stats.findings() });
            out.report(&md, &data, output.as_deref())
        },
        FeedbackAction::Progress { plan, output } => {
            let progress = PlanProgress::from_file(&plan)?;
            let md = render_progress_report(&progress, &plan, now);
            let data = serde_json::json!({
                "progress": progress,
                "risk": progress.risk(),
                "advice": progress.advice(),
            });
            out.report(&md, &data, output.as_deref())
        },
        FeedbackAction::Changelog {
            version,
            records,
            output,
            prepend,
        } => {
            let entries = ChangelogEntries::from_records(&load_records(&records));
            let section = render_changelog_section(&version, now.date(), &entries);
            match (prepend, output) {
                (true, Some(path)) => {
                    let existing = match std::fs::read_to_string(&path) {
                        Ok(text) => text,
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
                        Err(e) => Err(e).with_context(|| format!("reading {}", path.display()))?,
                    };
                    let updated = prepend_to_changelog(&existing, &section)?;
                    out.report(&updated, &entries, Some(&path))
                },
                (_, output) => out.report(&section, &entries, output.as_deref()),
            }
        },
        FeedbackAction::Github {
            repo,
            token,
            output,
        } => {
            let token = resolve_token(token, config);
            let client = GithubClient::new(&config.github_api_base, token)?;
            let issues = client.list_issues(&repo, config.issue_limit).await?;
            let md = render_issues_report(&repo, &issues, now);
            let buckets = IssueBuckets::classify(&issues);
            let data = serde_json::json!({
                "repo": repo,
                "issues": issues,
                "critical": buckets.critical.len(),
                "major": buckets.major.len(),
                "minor": buckets.minor.len(),
            });
            out.report(&md, &data, output.as_deref())
        },
    }
}

/// A non-blank `--token`/`GITHUB_TOKEN` wins over the config file.
fn resolve_token(flag: Option<String>, config: &FeedbackConfig) -> Option<Secret<String>> {
    flag.filter(|t| !t.trim().is_empty())
        .or_else(|| config.token().map(str::to_string))
        .map(Secret::new)
}
