//! Counts typed markers across feedback files and summarises them.
//!
//! Markers are matched as plain substrings outside fenced code blocks. The
//! English forms are canonical; the Chinese forms used by older feedback
//! files are accepted as aliases.

use std::{collections::BTreeMap, fmt::Write as _, path::Path};

use {chrono::NaiveDateTime, serde::Serialize, tracing::warn};

const PROBLEM_MARKERS: &[&str] = &["## Problem", "## 问题描述"];
const SUGGESTION_MARKERS: &[&str] = &["## Suggestion", "## 建议描述"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Bug,
    MissingFeature,
    Ux,
    NewFeature,
    Performance,
    Docs,
}

impl FeedbackType {
    pub const ALL: [Self; 6] = [
        Self::Bug,
        Self::MissingFeature,
        Self::Ux,
        Self::NewFeature,
        Self::Performance,
        Self::Docs,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Bug => "Bug",
            Self::MissingFeature => "Missing feature",
            Self::Ux => "UX",
            Self::NewFeature => "New feature",
            Self::Performance => "Performance",
            Self::Docs => "Docs",
        }
    }

    fn markers(self) -> &'static [&'static str] {
        match self {
            Self::Bug => &["🔴 Bug"],
            Self::MissingFeature => &["🟡 Missing feature", "🟡 功能缺失"],
            Self::Ux => &["🟢 UX", "🟢 体验优化"],
            Self::NewFeature => &["✨ New feature", "✨ 新功能"],
            Self::Performance => &["🚀 Performance", "🚀 性能优化"],
            Self::Docs => &["📝 Docs", "📝 文档改进"],
        }
    }

    /// `↑` once `count` passes the type's watch threshold, `→` otherwise.
    pub fn trend(self, count: usize) -> &'static str {
        let threshold = match self {
            Self::NewFeature => 3,
            _ => 5,
        };
        if count > threshold { "↑" } else { "→" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Priority {
    P0,
    P1,
    P2,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::P0, Self::P1, Self::P2];

    pub fn label(self) -> &'static str {
        match self {
            Self::P0 => "P0 Critical",
            Self::P1 => "P1 Major",
            Self::P2 => "P2 Minor",
        }
    }

    pub fn response_time(self) -> &'static str {
        match self {
            Self::P0 => "24 hours",
            Self::P1 => "1 week",
            Self::P2 => "1 month",
        }
    }

    fn markers(self) -> &'static [&'static str] {
        match self {
            Self::P0 => &["🔴 Critical", "🔴 严重"],
            Self::P1 => &["🟡 Major", "🟡 主要"],
            Self::P2 => &["🟢 Minor", "🟢 一般"],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedbackStats {
    /// Problem reports plus suggestions.
    pub total: usize,
    pub by_type: BTreeMap<FeedbackType, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
    pub sources: usize,
}

/// Observations derived from [`FeedbackStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Findings {
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub quality_actions: Vec<String>,
    pub product_actions: Vec<String>,
}

impl FeedbackStats {
    /// Aggregate `(name, content)` pairs.
    pub fn from_sources(sources: &[(String, String)]) -> Self {
        let mut stats = Self {
            sources: sources.len(),
            ..Self::default()
        };
        for (_, content) in sources {
            let text = outside_fences(content);
            stats.total += count_any(&text, PROBLEM_MARKERS) + count_any(&text, SUGGESTION_MARKERS);
            for kind in FeedbackType::ALL {
                *stats.by_type.entry(kind).or_default() += count_any(&text, kind.markers());
            }
            for priority in Priority::ALL {
                *stats.by_priority.entry(priority).or_default() +=
                    count_any(&text, priority.markers());
            }
        }
        stats
    }

    pub fn count(&self, kind: FeedbackType) -> usize {
        self.by_type.get(&kind).copied().unwrap_or(0)
    }

    pub fn priority(&self, priority: Priority) -> usize {
        self.by_priority.get(&priority).copied().unwrap_or(0)
    }

    /// Integer share of the total, in percent.
    pub fn percent(&self, n: usize) -> usize {
        n * 100 / self.total.max(1)
    }

    pub fn findings(&self) -> Findings {
        let bugs = self.count(FeedbackType::Bug);
        let features = self.count(FeedbackType::NewFeature);
        let p0 = self.priority(Priority::P0);
        let mut findings = Findings::default();

        if p0 == 0 {
            findings
                .strengths
                .push("No critical bugs; quality is stable".into());
        }
        if features > bugs {
            findings
                .strengths
                .push("More feature requests than bugs; demand is healthy".into());
        }
        if bugs > 10 {
            findings
                .concerns
                .push("High bug count; tighten quality control".into());
        }
        if p0 > 0 {
            findings
                .concerns
                .push(format!("{p0} critical issue(s) need immediate attention"));
        }
        if bugs > 5 {
            findings.quality_actions.extend([
                "Strengthen code review".to_string(),
                "Add automated tests".to_string(),
                "Set up bug prevention checks".to_string(),
            ]);
        }
        if features > 3 {
            findings.product_actions.extend([
                "Evaluate high-demand feature requests".to_string(),
                "Draft a product roadmap".to_string(),
            ]);
        }
        findings
    }
}

/// Read feedback files, skipping unreadable ones.
pub fn load_sources<P: AsRef<Path>>(paths: &[P]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| {
            let path = path.as_ref();
            match std::fs::read_to_string(path) {
                Ok(content) => Some((path.display().to_string(), content)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read feedback file");
                    None
                },
            }
        })
        .collect()
}

fn count_any(text: &str, markers: &[&str]) -> usize {
    markers.iter().map(|m| text.matches(m).count()).sum()
}

/// `content` with fenced code blocks removed.
fn outside_fences(content: &str) -> String {
    let mut in_fence = false;
    let mut out = String::with_capacity(content.len());
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

pub fn render_feedback_report(
    stats: &FeedbackStats,
    sources: &[(String, String)],
    generated_at: NaiveDateTime,
) -> String {
    let mut md = String::from("# Feedback Analysis Report\n\n");
    let _ = writeln!(md, "**Analyzed:** {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(md, "**Sources:** {} file(s)", stats.sources);
    let _ = writeln!(md, "**Total feedback:** {}\n", stats.total);

    md.push_str(
        "## Feedback by Type\n\n\
         | Type | Count | Share | Trend |\n\
         |------|-------|-------|-------|\n",
    );
    for kind in FeedbackType::ALL {
        let n = stats.count(kind);
        let _ = writeln!(
            md,
            "| **{}** | {n} | {}% | {} |",
            kind.label(),
            stats.percent(n),
            kind.trend(n)
        );
    }

    md.push_str(
        "\n## Feedback by Priority\n\n\
         | Priority | Count | Share | Response time |\n\
         |----------|-------|-------|---------------|\n",
    );
    for priority in Priority::ALL {
        let n = stats.priority(priority);
        let _ = writeln!(
            md,
            "| **{}** | {n} | {}% | {} |",
            priority.label(),
            stats.percent(n),
            priority.response_time()
        );
    }

    let findings = stats.findings();
    md.push_str("\n## Key Findings\n\n### Strengths\n\n");
    push_list(&mut md, "- ", &findings.strengths);
    md.push_str("\n### Concerns\n\n");
    push_list(&mut md, "- ", &findings.concerns);

    md.push_str("\n## Recommendations\n\n### Quality\n\n");
    push_list(&mut md, "- [ ] ", &findings.quality_actions);
    md.push_str(
        "\n### Process\n\n\
         - [ ] Define a response SLA for feedback\n\
         - [ ] Review feedback regularly\n\
         - [ ] Close the loop with reporters\n",
    );
    md.push_str("\n### Product\n\n");
    push_list(&mut md, "- [ ] ", &findings.product_actions);

    md.push_str("\n## Action Plan\n\n");
    let _ = writeln!(
        md,
        "- [ ] Resolve all P0 issues ({})",
        stats.priority(Priority::P0)
    );
    let _ = writeln!(
        md,
        "- [ ] Resolve P1 issues ({})",
        stats.priority(Priority::P1)
    );
    md.push_str("- [ ] Reply to all unanswered feedback\n");

    md.push_str("\n## Sources\n\n");
    for (name, _) in sources {
        let _ = writeln!(md, "- {name}");
    }
    md
}

fn push_list(md: &mut String, prefix: &str, items: &[String]) {
    if items.is_empty() {
        md.push_str("_None._\n");
    }
    for item in items {
        let _ = writeln!(md, "{prefix}{item}");
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, chrono::NaiveDate, rstest::rstest};

    fn source(content: &str) -> (String, String) {
        ("feedback.md".to_string(), content.to_string())
    }

    const FEEDBACK: &str = "\
## Problem
Lint crashes on empty files.
**Type:** 🔴 Bug
**Severity:** 🔴 Critical

## Problem
Slow on large corpora.
**Type:** 🚀 Performance
**Severity:** 🟡 Major

## 建议描述
支持批量检查
**类型:** ✨ 新功能
";

    #[test]
    fn counts_markers_and_aliases() {
        let stats = FeedbackStats::from_sources(&[source(FEEDBACK)]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.count(FeedbackType::Bug), 1);
        assert_eq!(stats.count(FeedbackType::Performance), 1);
        assert_eq!(stats.count(FeedbackType::NewFeature), 1);
        assert_eq!(stats.count(FeedbackType::Docs), 0);
        assert_eq!(stats.priority(Priority::P0), 1);
        assert_eq!(stats.priority(Priority::P1), 1);
        assert_eq!(stats.percent(1), 33);
    }

    #[test]
    fn fenced_examples_are_ignored() {
        let content = "```markdown\n## Problem\n🔴 Bug\n```\n";
        let stats = FeedbackStats::from_sources(&[source(content)]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.count(FeedbackType::Bug), 0);
    }

    #[test]
    fn blank_template_counts_nothing() {
        let at = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let template = crate::template::render_feedback_template("x", "v1", at);
        let stats = FeedbackStats::from_sources(&[source(&template)]);
        assert_eq!(stats.total, 0);
        assert!(stats.by_type.values().all(|n| *n == 0));
        assert!(stats.by_priority.values().all(|n| *n == 0));
    }

    #[test]
    fn percent_of_empty_total_is_zero() {
        let stats = FeedbackStats::default();
        assert_eq!(stats.percent(0), 0);
    }

    #[test]
    fn findings_follow_thresholds() {
        let bugs = "🔴 Bug\n".repeat(11);
        let stats = FeedbackStats::from_sources(&[source(&bugs)]);
        let findings = stats.findings();
        assert_eq!(findings.strengths, vec!["No critical bugs; quality is stable"]);
        assert_eq!(findings.concerns, vec!["High bug count; tighten quality control"]);
        assert_eq!(findings.quality_actions.len(), 3);
        assert!(findings.product_actions.is_empty());

        let features = "✨ New feature\n".repeat(4) + "🔴 Critical\n";
        let findings = FeedbackStats::from_sources(&[source(&features)]).findings();
        assert_eq!(findings.strengths, vec![
            "More feature requests than bugs; demand is healthy"
        ]);
        assert_eq!(findings.concerns, vec!["1 critical issue(s) need immediate attention"]);
        assert_eq!(findings.product_actions.len(), 2);
    }

    #[test]
    fn load_sources_skips_unreadable() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("a.md");
        std::fs::write(&good, FEEDBACK).unwrap();
        let sources = load_sources(&[good, tmp.path().join("missing.md")]);
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn report_lists_tables_and_sources() {
        let sources = vec![source(FEEDBACK)];
        let stats = FeedbackStats::from_sources(&sources);
        let at = NaiveDate::from_ymd_opt(2026, 2, 27)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let md = render_feedback_report(&stats, &sources, at);
        assert!(md.contains("**Total feedback:** 3"));
        assert!(md.contains("| **Bug** | 1 | 33% | → |"));
        assert!(md.contains("| **P0 Critical** | 1 | 33% | 24 hours |"));
        assert!(md.contains("- [ ] Resolve all P0 issues (1)"));
        assert!(md.contains("- feedback.md"));
    }

    #[rstest]
    #[case(FeedbackType::Bug, 5, "→")]
    #[case(FeedbackType::Bug, 6, "↑")]
    #[case(FeedbackType::Ux, 6, "↑")]
    #[case(FeedbackType::NewFeature, 3, "→")]
    #[case(FeedbackType::NewFeature, 4, "↑")]
    fn trend_marks_rising_types(
        #[case] kind: FeedbackType,
        #[case] count: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(kind.trend(count), expected);
    }

    #[test]
    fn report_shows_trend_column() {
        let content = "## Problem\n✨ New feature\n".repeat(4);
        let sources = vec![source(&content)];
        let stats = FeedbackStats::from_sources(&sources);
        let at = NaiveDate::from_ymd_opt(2026, 2, 27)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let md = render_feedback_report(&stats, &sources, at);
        assert!(md.contains("| Type | Count | Share | Trend |"));
        assert!(md.contains("| **New feature** | 4 | 100% | ↑ |"));
        assert!(md.contains("| **Bug** | 0 | 0% | → |"));
    }
}
