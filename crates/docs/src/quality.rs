//! Heuristic quality scoring for documentation files.
//!
//! Each file is scored 0-100 on five dimensions; the project score is the
//! integer mean over all files. Accuracy cannot be judged from text alone
//! and is fixed.

use std::path::{Path, PathBuf};

use {serde::Serialize, tracing::warn};

use crate::{Severity, error::Result, improve::ImprovementPlan, scan::display_path};

const ACCURACY: u32 = 70;
const README_NAMES: &[&str] = &["README.md", "README.rst", "README.txt"];
const IMPORTANT_DOCS: &[&str] = &["CHANGELOG.md", "CONTRIBUTING.md", "LICENSE"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DimensionScores {
    pub completeness: u32,
    pub accuracy: u32,
    pub clarity: u32,
    pub structure: u32,
    pub maintainability: u32,
    pub overall: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileScore {
    /// Path relative to the project root.
    pub path: String,
    pub size: u64,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub kind: &'static str,
    pub description: String,
    pub fix: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityReport {
    pub scores: DimensionScores,
    pub files: Vec<FileScore>,
    pub issues: Vec<QualityIssue>,
    pub recommendations: ImprovementPlan,
}

/// Score one document. `file_name` enables the README-specific checks.
pub fn score_document(content: &str, file_name: &str) -> DimensionScores {
    let completeness = completeness(content, file_name);
    let clarity = clarity(content);
    let structure = structure(content);
    let maintainability = maintainability(content);
    let overall = (f64::from(completeness) * 0.30
        + f64::from(ACCURACY) * 0.10
        + f64::from(clarity) * 0.25
        + f64::from(structure) * 0.20
        + f64::from(maintainability) * 0.15) as u32;

    DimensionScores {
        completeness,
        accuracy: ACCURACY,
        clarity,
        structure,
        maintainability,
        overall,
    }
}

fn completeness(content: &str, file_name: &str) -> u32 {
    let mut checks = vec![
        content.contains('#'),
        content.chars().count() > 200,
        content.matches("## ").count() >= 2,
        content.contains("```"),
        content.contains("](") || content.contains("http"),
    ];
    if file_name.starts_with("README") {
        let lower = content.to_lowercase();
        checks.push(lower.contains("install"));
        checks.push(lower.contains("usage") || lower.contains("example"));
    }
    let passed = checks.iter().filter(|c| **c).count() as u32;
    (passed * 100 / checks.len() as u32).min(100)
}

fn clarity(content: &str) -> u32 {
    let mut score: i64 = 100;

    let long_paragraphs = content
        .split("\n\n")
        .filter(|p| p.chars().count() > 500)
        .count() as i64;
    score -= (long_paragraphs * 5).min(30);

    if content.contains('-') || content.contains('*') || content.contains("1.") {
        score += 10;
    }

    match content.matches('#').count() {
        n if n >= 5 => score += 10,
        n if n >= 3 => score += 5,
        _ => {},
    }

    score.clamp(0, 100) as u32
}

fn structure(content: &str) -> u32 {
    let lower = content.to_lowercase();
    let mut score = 0;
    if content.contains("# ") {
        score += 20;
    }
    if content.contains("## ") {
        score += 30;
    }
    if content.contains("### ") {
        score += 20;
    }
    if lower.contains("toc") || lower.contains("contents") {
        score += 15;
    }
    // Balanced code fences.
    if content.matches("```").count() % 2 == 0 {
        score += 15;
    }
    score.min(100)
}

fn maintainability(content: &str) -> u32 {
    let mut score: i64 = 100;
    if content.chars().count() > 50_000 {
        score -= 20;
    }
    if content.contains("TODO") || content.contains("FIXME") {
        score -= 15;
    }
    let links = content
        .split_whitespace()
        .filter(|w| w.starts_with('[') && w.contains("]("))
        .count();
    if links >= 5 {
        score += 15;
    }
    score.clamp(0, 100) as u32
}

/// Scores a project's documentation set.
pub struct QualityAnalyzer {
    root: PathBuf,
}

impl QualityAnalyzer {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn analyze(&self, files: &[PathBuf]) -> Result<QualityReport> {
        let mut report = QualityReport::default();

        if files.is_empty() {
            report.issues.push(QualityIssue {
                severity: Severity::Critical,
                kind: "no_docs",
                description: "No documentation files found".into(),
                fix: "Create README.md with project overview".into(),
            });
            return Ok(report);
        }

        let mut scores = Vec::with_capacity(files.len());
        for path in files {
            let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            let score = match std::fs::read(path) {
                Ok(bytes) => score_document(&String::from_utf8_lossy(&bytes), file_name),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read document");
                    DimensionScores::default()
                },
            };
            report.files.push(FileScore {
                path: display_path(&self.root, path),
                size,
                score: score.overall,
            });
            scores.push(score);
        }

        report.scores = average(&scores);
        self.check_required_docs(&mut report.issues);
        report.recommendations = recommendations(&report.scores);
        Ok(report)
    }

    fn check_required_docs(&self, issues: &mut Vec<QualityIssue>) {
        if !README_NAMES.iter().any(|n| self.root.join(n).is_file()) {
            issues.push(QualityIssue {
                severity: Severity::Critical,
                kind: "missing_readme",
                description: "Project has no README".into(),
                fix: "Create README.md with project overview".into(),
            });
        }
        for name in IMPORTANT_DOCS {
            if !self.root.join(name).exists() {
                issues.push(QualityIssue {
                    severity: Severity::Minor,
                    kind: "missing_doc",
                    description: format!("{name} is missing"),
                    fix: format!("Add {name}"),
                });
            }
        }
    }
}

fn average(scores: &[DimensionScores]) -> DimensionScores {
    let n = scores.len().max(1) as u32;
    let mean = |f: fn(&DimensionScores) -> u32| scores.iter().map(f).sum::<u32>() / n;
    DimensionScores {
        completeness: mean(|s| s.completeness),
        accuracy: mean(|s| s.accuracy),
        clarity: mean(|s| s.clarity),
        structure: mean(|s| s.structure),
        maintainability: mean(|s| s.maintainability),
        overall: mean(|s| s.overall),
    }
}

fn recommendations(scores: &DimensionScores) -> ImprovementPlan {
    let mut plan = ImprovementPlan::default();
    if scores.completeness < 60 {
        plan.quick_wins.push("Add project description and badges".into());
        plan.quick_wins.push("Add code examples".into());
    }
    if scores.structure < 60 {
        plan.short_term
            .push("Improve document structure with clear sections".into());
        plan.short_term.push("Add table of contents".into());
    }
    if scores.maintainability < 60 {
        plan.long_term.push("Break down large documents".into());
        plan.long_term.push("Remove TODOs and FIXMEs".into());
    }
    plan.long_term
        .push("Set up automated documentation generation".into());
    plan.long_term
        .push("Establish documentation review process".into());
    plan
}

/// Human label for a score.
pub fn score_label(score: u32) -> &'static str {
    match score {
        90.. => "excellent",
        80.. => "good",
        70.. => "fair",
        60.. => "needs work",
        _ => "poor",
    }
}

/// Status column used in the dimension table.
pub fn score_status(score: u32) -> &'static str {
    match score {
        80.. => "Good",
        60.. => "Needs Work",
        _ => "Poor",
    }
}
