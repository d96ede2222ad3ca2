/// Config schema types (skills, lint, matching, docs, feedback).
use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkilldeckConfig {
    pub skills: SkillsConfig,
    pub lint: LintConfig,
    pub matching: MatchingConfig,
    pub docs: DocsConfig,
    pub feedback: FeedbackConfig,
}

/// Where skills are looked up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Extra corpus roots, scanned after the project and personal directories.
    pub search_paths: Vec<PathBuf>,
    /// Scan `<cwd>/.skilldeck/skills`.
    pub include_project: bool,
    /// Scan `<data_dir>/skills`.
    pub include_personal: bool,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            include_project: true,
            include_personal: true,
        }
    }
}

/// Rules applied by `skills lint`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Descriptions longer than this (in chars) produce a warning.
    pub max_description_len: usize,
    pub max_name_len: usize,
    /// Warn when the front matter `name` differs from the directory name.
    pub require_name_matches_dir: bool,
    /// Verify that file paths mentioned in the body exist.
    pub check_references: bool,
    /// Directory prefixes that mark an inline code span as a file reference.
    pub reference_dirs: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            max_description_len: 1024,
            max_name_len: 64,
            require_name_matches_dir: true,
            check_references: true,
            reference_dirs: ["references", "templates", "scripts", "assets", "examples"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Task-to-skill ranking thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub min_score: f64,
    pub limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_score: 0.1,
            limit: 5,
        }
    }
}

/// Documentation scanning and checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// File extensions (without dot) treated as documentation.
    pub extensions: Vec<String>,
    /// Directory names pruned from every walk.
    pub exclude_dirs: Vec<String>,
    /// Cap on undocumented-endpoint issues per run.
    pub max_api_issues: usize,
    /// Fenced blocks inspected per Markdown file for stale examples.
    pub max_example_blocks: usize,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            extensions: ["md", "rst", "txt", "adoc"]
                .into_iter()
                .map(String::from)
                .collect(),
            exclude_dirs: ["node_modules", "vendor", ".git", "dist", "build"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_api_issues: 5,
            max_example_blocks: 3,
        }
    }
}

/// Feedback collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub github_api_base: String,
    /// Personal access token, usually `${GITHUB_TOKEN}`.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_token: Option<Secret<String>>,
    /// Maximum number of issues pulled into a report.
    pub issue_limit: usize,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            github_api_base: "https://api.github.com".into(),
            github_token: None,
            issue_limit: 50,
        }
    }
}

impl FeedbackConfig {
    /// Token with empty / unresolved placeholder values treated as absent.
    pub fn token(&self) -> Option<&str> {
        self.github_token
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|t| !t.trim().is_empty() && !t.starts_with("${"))
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
