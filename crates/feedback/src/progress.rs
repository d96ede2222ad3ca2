//! Checklist progress for a Markdown plan.

use std::{fmt::Write as _, path::Path};

use {chrono::NaiveDateTime, serde::Serialize};

use crate::error::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Behind,
    OnTrack,
    Good,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Behind => "Behind schedule",
            Self::OnTrack => "On track",
            Self::Good => "Good",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionProgress {
    pub heading: String,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanProgress {
    pub total: usize,
    pub completed: usize,
    pub percent: usize,
    /// Sections with at least one checklist item, in document order.
    pub sections: Vec<SectionProgress>,
}

impl PlanProgress {
    pub fn from_plan(content: &str) -> Self {
        let mut total = 0;
        let mut completed = 0;
        let mut sections: Vec<SectionProgress> = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim_start();
            if let Some(heading) = section_heading(trimmed) {
                sections.push(SectionProgress {
                    heading: heading.to_string(),
                    total: 0,
                    completed: 0,
                });
                continue;
            }
            let (open, done) = checkboxes(trimmed);
            total += open + done;
            completed += done;
            if let Some(section) = sections.last_mut() {
                section.total += open + done;
                section.completed += done;
            }
        }
        sections.retain(|s| s.total > 0);

        Self {
            total,
            completed,
            percent: completed * 100 / total.max(1),
            sections,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;
        Ok(Self::from_plan(&content))
    }

    pub fn risk(&self) -> RiskLevel {
        if self.percent < 50 && self.total > 5 {
            RiskLevel::Behind
        } else if self.percent < 80 {
            RiskLevel::OnTrack
        } else {
            RiskLevel::Good
        }
    }

    pub fn advice(&self) -> &'static [&'static str] {
        if self.percent < 30 {
            &[
                "Coordinate with the team on blockers",
                "Reprioritise the remaining tasks",
                "Consider adding resources",
            ]
        } else if self.percent < 70 {
            &["Keep the current pace", "Focus on the key tasks"]
        } else {
            &["Prepare acceptance testing", "Plan the release"]
        }
    }
}

fn section_heading(line: &str) -> Option<&str> {
    line.strip_prefix("### ")
        .or_else(|| line.strip_prefix("## "))
        .map(str::trim)
}

/// `(open, done)` checkbox markers anywhere in `line`.
fn checkboxes(line: &str) -> (usize, usize) {
    let open = line.matches("- [ ]").count();
    let done = line.matches("- [x]").count() + line.matches("- [X]").count();
    (open, done)
}

pub fn render_progress_report(
    progress: &PlanProgress,
    plan_path: &Path,
    generated_at: NaiveDateTime,
) -> String {
    let mut md = String::from("# Progress Report\n\n");
    let _ = writeln!(md, "**Updated:** {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(md, "**Plan:** `{}`\n", plan_path.display());

    md.push_str("## Overall\n\n");
    let _ = writeln!(md, "- Total tasks: {}", progress.total);
    let _ = writeln!(md, "- Completed: {}", progress.completed);
    let _ = writeln!(md, "- Remaining: {}", progress.total - progress.completed);
    let _ = writeln!(md, "- Progress: {}%", progress.percent);
    let _ = writeln!(md, "- Status: {}", progress.risk().label());

    if !progress.sections.is_empty() {
        md.push_str("\n## Sections\n\n| Section | Done | Total | Progress |\n|---------|------|-------|----------|\n");
        for s in &progress.sections {
            let _ = writeln!(
                md,
                "| {} | {} | {} | {}% |",
                s.heading,
                s.completed,
                s.total,
                s.completed * 100 / s.total.max(1)
            );
        }
    }

    md.push_str("\n## Next Steps\n\n");
    for item in progress.advice() {
        let _ = writeln!(md, "- [ ] {item}");
    }
    md
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, chrono::NaiveDate, rstest::rstest};

    const PLAN: &str = "\
# Plan

## Phase 1
- [x] scaffold
- [X] lint rules
- [ ] watcher

### Notes
Nothing to track here.

## Phase 2
  - [ ] docs
- not a task
";

    #[test]
    fn counts_items_and_sections() {
        let progress = PlanProgress::from_plan(PLAN);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.percent, 50);
        assert_eq!(progress.sections, vec![
            SectionProgress {
                heading: "Phase 1".into(),
                total: 3,
                completed: 2,
            },
            SectionProgress {
                heading: "Phase 2".into(),
                total: 1,
                completed: 0,
            },
        ]);
    }

    #[test]
    fn every_marker_on_a_line_counts() {
        let plan = "## Review\n| item | - [x] owner | - [ ] qa |\nnotes - [X] done\n";
        let progress = PlanProgress::from_plan(plan);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.sections[0].total, 3);
    }

    #[test]
    fn empty_plan_is_zero_percent() {
        let progress = PlanProgress::from_plan("# Nothing\n");
        assert_eq!(progress.total, 0);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.risk(), RiskLevel::OnTrack);
    }

    #[rstest]
    #[case(1, 10, RiskLevel::Behind)]
    #[case(2, 5, RiskLevel::OnTrack)]
    #[case(7, 10, RiskLevel::OnTrack)]
    #[case(8, 10, RiskLevel::Good)]
    fn risk_levels(#[case] done: usize, #[case] total: usize, #[case] expected: RiskLevel) {
        let plan = "- [x] t\n".repeat(done) + &"- [ ] t\n".repeat(total - done);
        assert_eq!(PlanProgress::from_plan(&plan).risk(), expected);
    }

    #[rstest]
    #[case(2, "Consider adding resources")]
    #[case(5, "Focus on the key tasks")]
    #[case(9, "Plan the release")]
    fn advice_tracks_percent(#[case] done: usize, #[case] expected: &str) {
        let plan = "- [x] t\n".repeat(done) + &"- [ ] t\n".repeat(10 - done);
        assert!(
            PlanProgress::from_plan(&plan)
                .advice()
                .iter()
                .any(|a| *a == expected)
        );
    }

    #[test]
    fn missing_plan_is_an_error() {
        let err = PlanProgress::from_file(Path::new("/nonexistent/plan.md")).unwrap_err();
        assert!(err.to_string().contains("failed to read plan"));
    }

    #[test]
    fn report_renders_sections() {
        let progress = PlanProgress::from_plan(PLAN);
        let at = NaiveDate::from_ymd_opt(2026, 4, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let md = render_progress_report(&progress, Path::new("plan.md"), at);
        assert!(md.contains("- Progress: 50%"));
        assert!(md.contains("- Status: On track"));
        assert!(md.contains("| Phase 1 | 2 | 3 | 66% |"));
        assert!(md.contains("- [ ] Keep the current pace"));
    }
}
