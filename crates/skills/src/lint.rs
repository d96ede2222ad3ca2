//! Structural checks for skill directories.
//!
//! Every skill must carry front matter with a non-empty `name` and
//! `description`, and every file its body points at must exist inside the
//! skill directory.

use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
};

use {
    pulldown_cmark::{Event, Parser, Tag},
    serde::Serialize,
    skilldeck_config::LintConfig,
};

use crate::parse::{self, FrontmatterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LintRule {
    MissingSkillMd,
    MissingFrontmatter,
    InvalidFrontmatter,
    MissingName,
    MissingDescription,
    InvalidName,
    NameMismatch,
    DescriptionTooLong,
    EmptyBody,
    MissingReference,
    ReferenceEscapes,
    DuplicateName,
}

impl LintRule {
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingSkillMd => "missing-skill-md",
            Self::MissingFrontmatter => "missing-frontmatter",
            Self::InvalidFrontmatter => "invalid-frontmatter",
            Self::MissingName => "missing-name",
            Self::MissingDescription => "missing-description",
            Self::InvalidName => "invalid-name",
            Self::NameMismatch => "name-mismatch",
            Self::DescriptionTooLong => "description-too-long",
            Self::EmptyBody => "empty-body",
            Self::MissingReference => "missing-reference",
            Self::ReferenceEscapes => "reference-escapes",
            Self::DuplicateName => "duplicate-name",
        }
    }
}

impl std::fmt::Display for LintRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A single problem found in a skill directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub severity: LintSeverity,
    pub rule: LintRule,
    pub skill_dir: PathBuf,
    pub message: String,
    /// 1-based line in `SKILL.md`, when the finding points at one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl LintFinding {
    fn new(
        severity: LintSeverity,
        rule: LintRule,
        skill_dir: &Path,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            rule,
            skill_dir: skill_dir.to_path_buf(),
            message: message.into(),
            line: None,
        }
    }

    fn error(rule: LintRule, skill_dir: &Path, message: impl Into<String>) -> Self {
        Self::new(LintSeverity::Error, rule, skill_dir, message)
    }

    fn warning(rule: LintRule, skill_dir: &Path, message: impl Into<String>) -> Self {
        Self::new(LintSeverity::Warning, rule, skill_dir, message)
    }

    fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for LintFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = self.skill_dir.join("SKILL.md");
        match self.line {
            Some(line) => write!(f, "{}:{line}", file.display())?,
            None => write!(f, "{}", file.display())?,
        }
        write!(f, ": {} [{}] {}", self.severity, self.rule, self.message)
    }
}

/// Findings for a whole corpus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub findings: Vec<LintFinding>,
    pub skills_checked: usize,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == LintSeverity::Error)
    }

    pub fn count(&self, severity: LintSeverity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}

/// A relative file path mentioned in a skill body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub path: String,
    /// 1-based line within the body.
    pub line: usize,
}

pub struct SkillLinter {
    config: LintConfig,
}

impl SkillLinter {
    pub fn new(config: LintConfig) -> Self {
        Self { config }
    }

    /// Lint one skill directory.
    pub fn lint_skill_dir(&self, dir: &Path) -> Vec<LintFinding> {
        self.check_dir(dir).0
    }

    /// Lint every directory, then flag names claimed by an earlier skill.
    pub fn lint_corpus(&self, dirs: &[PathBuf]) -> LintReport {
        let mut report = LintReport::default();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for dir in dirs {
            let (findings, name) = self.check_dir(dir);
            report.findings.extend(findings);
            report.skills_checked += 1;

            let Some(name) = name else {
                continue;
            };
            if let Some(first) = seen.get(&name) {
                report.findings.push(LintFinding::error(
                    LintRule::DuplicateName,
                    dir,
                    format!(
                        "name '{name}' is already used by {}",
                        first.display()
                    ),
                ));
            } else {
                seen.insert(name, dir.clone());
            }
        }

        tracing::debug!(
            skills = report.skills_checked,
            findings = report.findings.len(),
            "lint complete"
        );
        report
    }

    /// Findings plus the skill name when it is valid.
    fn check_dir(&self, dir: &Path) -> (Vec<LintFinding>, Option<String>) {
        let mut findings = Vec::new();
        let skill_md = dir.join("SKILL.md");
        if !skill_md.is_file() {
            findings.push(LintFinding::error(
                LintRule::MissingSkillMd,
                dir,
                "directory has no SKILL.md",
            ));
            return (findings, None);
        }

        let content = match std::fs::read_to_string(&skill_md) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(?skill_md, %e, "failed to read SKILL.md");
                findings.push(LintFinding::error(
                    LintRule::MissingSkillMd,
                    dir,
                    format!("SKILL.md is unreadable: {e}"),
                ));
                return (findings, None);
            },
        };

        match parse::split_frontmatter(&content) {
            Ok(_) => {},
            Err(FrontmatterError::MissingOpening) => {
                findings.push(LintFinding::error(
                    LintRule::MissingFrontmatter,
                    dir,
                    "SKILL.md does not start with a --- front matter block",
                ));
                return (findings, None);
            },
            Err(e @ FrontmatterError::MissingClosing) => {
                findings.push(LintFinding::error(
                    LintRule::InvalidFrontmatter,
                    dir,
                    e.to_string(),
                ));
                return (findings, None);
            },
        }

        let (frontmatter, body) = match parse::parse_frontmatter_value(&content) {
            Ok(parsed) => parsed,
            Err(e) => {
                findings.push(LintFinding::error(
                    LintRule::InvalidFrontmatter,
                    dir,
                    format!("{e:#}"),
                ));
                return (findings, None);
            },
        };

        let name = self.check_name(dir, &frontmatter, &mut findings);
        self.check_description(dir, &frontmatter, &mut findings);

        if body.trim().is_empty() {
            findings.push(LintFinding::warning(
                LintRule::EmptyBody,
                dir,
                "SKILL.md has no instructions after the front matter",
            ));
        } else if self.config.check_references {
            let offset = parse::body_start_line(&content) - 1;
            self.check_references(dir, &body, offset, &mut findings);
        }

        (findings, name)
    }

    fn check_name(
        &self,
        dir: &Path,
        frontmatter: &serde_yaml::Mapping,
        findings: &mut Vec<LintFinding>,
    ) -> Option<String> {
        let name = match frontmatter.get("name") {
            None | Some(serde_yaml::Value::Null) => None,
            Some(serde_yaml::Value::String(s)) => Some(s.trim()),
            Some(_) => {
                findings.push(LintFinding::error(
                    LintRule::InvalidName,
                    dir,
                    "name must be a string",
                ));
                return None;
            },
        };
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            findings.push(LintFinding::error(
                LintRule::MissingName,
                dir,
                "front matter has no name",
            ));
            return None;
        };

        if !parse::validate_name(name) || name.chars().count() > self.config.max_name_len {
            findings.push(LintFinding::error(
                LintRule::InvalidName,
                dir,
                format!(
                    "invalid name '{name}': use 1-{} lowercase letters, digits and single hyphens",
                    self.config.max_name_len.min(parse::MAX_NAME_LEN)
                ),
            ));
            return None;
        }

        if self.config.require_name_matches_dir
            && let Some(dir_name) = dir.file_name().and_then(|n| n.to_str())
            && dir_name != name
        {
            findings.push(LintFinding::warning(
                LintRule::NameMismatch,
                dir,
                format!("name '{name}' differs from directory name '{dir_name}'"),
            ));
        }

        Some(name.to_string())
    }

    fn check_description(
        &self,
        dir: &Path,
        frontmatter: &serde_yaml::Mapping,
        findings: &mut Vec<LintFinding>,
    ) {
        let description = frontmatter
            .get("description")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or_default();
        if description.is_empty() {
            findings.push(LintFinding::error(
                LintRule::MissingDescription,
                dir,
                "front matter has no description",
            ));
            return;
        }

        let len = description.chars().count();
        if len > self.config.max_description_len {
            findings.push(LintFinding::warning(
                LintRule::DescriptionTooLong,
                dir,
                format!(
                    "description is {len} chars, limit is {}",
                    self.config.max_description_len
                ),
            ));
        }
    }

    fn check_references(
        &self,
        dir: &Path,
        body: &str,
        line_offset: usize,
        findings: &mut Vec<LintFinding>,
    ) {
        for reference in extract_references(body, &self.config.reference_dirs) {
            let line = reference.line + line_offset;
            if escapes_dir(&reference.path) {
                findings.push(
                    LintFinding::error(
                        LintRule::ReferenceEscapes,
                        dir,
                        format!("'{}' points outside the skill directory", reference.path),
                    )
                    .at_line(line),
                );
            } else if !dir.join(&reference.path).exists() {
                findings.push(
                    LintFinding::error(
                        LintRule::MissingReference,
                        dir,
                        format!("referenced file '{}' does not exist", reference.path),
                    )
                    .at_line(line),
                );
            }
        }
    }
}

/// Relative file paths mentioned in a skill body: Markdown link and image
/// targets, plus inline code spans naming a file under one of
/// `reference_dirs`. Deduplicated by path, first occurrence kept.
pub fn extract_references(body: &str, reference_dirs: &[String]) -> Vec<Reference> {
    let mut refs: Vec<Reference> = Vec::new();
    let mut push = |path: String, offset: usize| {
        if refs.iter().any(|r| r.path == path) {
            return;
        }
        let line = body[..offset].matches('\n').count() + 1;
        refs.push(Reference { path, line });
    };

    for (event, range) in Parser::new(body).into_offset_iter() {
        match event {
            Event::Start(Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. }) => {
                if let Some(path) = link_target_path(&dest_url) {
                    push(path, range.start);
                }
            },
            Event::Code(code) => {
                if let Some(path) = code_span_path(&code, reference_dirs) {
                    push(path, range.start);
                }
            },
            _ => {},
        }
    }
    refs
}

fn link_target_path(dest: &str) -> Option<String> {
    let dest = dest.trim();
    if dest.is_empty() || dest.starts_with('#') || dest.starts_with("//") || has_scheme(dest) {
        return None;
    }
    let end = dest.find(['#', '?']).unwrap_or(dest.len());
    let path = dest[..end].trim_start_matches("./");
    (!path.is_empty()).then(|| path.to_string())
}

fn code_span_path(code: &str, reference_dirs: &[String]) -> Option<String> {
    let code = code.trim();
    if code.is_empty() || code.contains(char::is_whitespace) || !code.contains('/') {
        return None;
    }
    let path = code.strip_prefix("./").unwrap_or(code);
    let under_reference_dir = reference_dirs.iter().any(|d| {
        path.strip_prefix(d.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    });
    if !under_reference_dir || Path::new(path).extension().is_none() {
        return None;
    }
    Some(path.to_string())
}

/// `scheme:` prefix as in RFC 3986 (`https:`, `mailto:`, `file:`).
fn has_scheme(dest: &str) -> bool {
    let Some((scheme, _)) = dest.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// True for absolute paths and paths whose `..` climbs above the skill dir.
fn escapes_dir(path: &str) -> bool {
    let mut depth: i32 = 0;
    for component in Path::new(path).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return true,
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return true;
                }
            },
            Component::Normal(_) => depth += 1,
            Component::CurDir => {},
        }
    }
    false
}
