//! Feedback loop for skills: collection templates, marker analysis, plan
//! progress, changelog generation and GitHub issue reports.

pub mod analyze;
pub mod changelog;
pub mod error;
pub mod github;
pub mod progress;
pub mod template;

pub use {
    analyze::{FeedbackStats, FeedbackType, Findings, Priority, load_sources, render_feedback_report},
    changelog::{
        ChangeCategory, ChangelogEntries, load_records, prepend_to_changelog,
        render_changelog_section,
    },
    error::{Error, Result},
    github::{GithubClient, Issue, IssueBuckets, Label, render_issues_report},
    progress::{PlanProgress, RiskLevel, SectionProgress, render_progress_report},
    template::render_feedback_template,
};
