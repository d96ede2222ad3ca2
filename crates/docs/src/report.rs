//! Markdown renderers for the documentation reports.

use std::{fmt::Write as _, path::Path};

use chrono::NaiveDateTime;

use crate::{
    ConsistencyIssue, GeneratedDoc, ImprovementPlan, QualityReport, Severity,
    quality::{score_label, score_status},
};

const MAX_ISSUES_PER_SEVERITY: usize = 10;

pub fn render_quality_report(
    report: &QualityReport,
    root: &Path,
    generated_at: NaiveDateTime,
) -> String {
    let s = &report.scores;
    let mut md = String::new();
    md.push_str("# Documentation Quality Report\n\n");
    let _ = writeln!(md, "**Generated:** {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(md, "**Path:** {}", root.display());
    let _ = writeln!(md, "**Files analyzed:** {}\n", report.files.len());

    md.push_str("## Overall Score\n\n");
    let _ = writeln!(md, "**{}/100** ({})\n", s.overall, score_label(s.overall));

    md.push_str("## Dimension Scores\n\n");
    md.push_str("| Dimension | Score | Status |\n");
    md.push_str("|-----------|-------|--------|\n");
    for (name, score) in [
        ("Completeness", s.completeness),
        ("Accuracy", s.accuracy),
        ("Clarity", s.clarity),
        ("Structure", s.structure),
        ("Maintainability", s.maintainability),
    ] {
        let _ = writeln!(md, "| {name} | {score}/100 | {} |", score_status(score));
    }

    if !report.files.is_empty() {
        md.push_str("\n## Files\n\n| File | Size | Score |\n|------|------|-------|\n");
        for file in &report.files {
            let _ = writeln!(md, "| `{}` | {} | {}/100 |", file.path, file.size, file.score);
        }
    }

    if !report.issues.is_empty() {
        md.push_str("\n## Issues\n\n");
        for issue in &report.issues {
            let _ = writeln!(
                md,
                "- **[{}]** {}\n  - Fix: {}",
                issue.severity.to_string().to_uppercase(),
                issue.description,
                issue.fix
            );
        }
    }

    md.push_str("\n## Recommendations\n");
    push_checklist(&mut md, "### Quick Wins", &report.recommendations.quick_wins);
    push_checklist(&mut md, "### Short Term", &report.recommendations.short_term);
    push_checklist(&mut md, "### Long Term", &report.recommendations.long_term);
    md
}

pub fn render_consistency_report(issues: &[ConsistencyIssue]) -> String {
    let mut md = String::new();
    md.push_str("# Consistency Check Report\n\n");
    let _ = writeln!(md, "**Issues Found:** {}", issues.len());

    if issues.is_empty() {
        md.push_str("\nNo consistency issues found.\n");
        return md;
    }

    for severity in [Severity::Critical, Severity::Major, Severity::Minor] {
        let group: Vec<_> = issues.iter().filter(|i| i.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(
            md,
            "\n## {} ({})",
            severity.to_string().to_uppercase(),
            group.len()
        );
        for issue in group.iter().take(MAX_ISSUES_PER_SEVERITY) {
            let _ = writeln!(md, "\n### {}\n", issue.kind);
            let _ = writeln!(md, "- **Location:** `{}`", issue.location);
            let _ = writeln!(md, "- **Issue:** {}", issue.description);
            let _ = writeln!(md, "- **Fix:** {}", issue.fix);
        }
        if group.len() > MAX_ISSUES_PER_SEVERITY {
            let _ = writeln!(
                md,
                "\n_{} more not shown._",
                group.len() - MAX_ISSUES_PER_SEVERITY
            );
        }
    }
    md
}

pub fn render_improvement_plan(plan: &ImprovementPlan) -> String {
    let mut md = String::from("# Documentation Improvement Plan\n");
    push_checklist(&mut md, "## Quick Wins (Hours)", &plan.quick_wins);
    push_checklist(&mut md, "## Short Term (Days)", &plan.short_term);
    push_checklist(&mut md, "## Long Term (Weeks)", &plan.long_term);
    md
}

pub fn render_generation_summary(docs: &[GeneratedDoc]) -> String {
    let mut md = String::from("# Generated Documentation\n\n");
    let written = docs.iter().filter(|d| d.written).count();
    let _ = writeln!(md, "**Written:** {written} of {}\n", docs.len());
    for doc in docs {
        let status = if doc.written {
            "generated"
        } else {
            "kept existing"
        };
        let _ = writeln!(md, "- `{}` ({status})", doc.path.display());
    }
    md
}

fn push_checklist(md: &mut String, heading: &str, items: &[String]) {
    let _ = writeln!(md, "\n{heading}\n");
    if items.is_empty() {
        md.push_str("_Nothing to do._\n");
    }
    for item in items {
        let _ = writeln!(md, "- [ ] {item}");
    }
}
