#![allow(clippy::unwrap_used, clippy::expect_used)]
use {
    chrono::NaiveDate,
    skilldeck_feedback::{
        ChangelogEntries, FeedbackStats, FeedbackType, PlanProgress, Priority, load_records,
        load_sources, prepend_to_changelog, render_changelog_section, render_feedback_report,
        render_feedback_template,
    },
};

#[test]
fn template_to_changelog_cycle() {
    let tmp = tempfile::tempdir().unwrap();
    let at = NaiveDate::from_ymd_opt(2026, 6, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();

    // A filled-in template: the guide examples stay fenced, records are real.
    let mut feedback = render_feedback_template("docs-improver", "v1.0", at);
    feedback.push_str(
        "\n## Problem\nBroken link check misses anchors.\n\
         **Type:** 🔴 Bug\n**Severity:** 🟡 Major\n\n\
         ## Suggestion\nScore rst files too.\n**Type:** ✨ New feature\n",
    );
    let feedback_path = tmp.path().join("docs-improver-feedback.md");
    std::fs::write(&feedback_path, feedback).unwrap();

    let sources = load_sources(&[feedback_path]);
    let stats = FeedbackStats::from_sources(&sources);
    assert_eq!(stats.total, 2);
    assert_eq!(stats.count(FeedbackType::Bug), 1);
    assert_eq!(stats.count(FeedbackType::NewFeature), 1);
    assert_eq!(stats.priority(Priority::P1), 1);
    let report = render_feedback_report(&stats, &sources, at);
    assert!(report.contains("| **Bug** | 1 | 50% |"));

    let plan = "## Fixes\n- [x] anchor links\n- [ ] rst scoring\n";
    let progress = PlanProgress::from_plan(plan);
    assert_eq!(progress.percent, 50);

    let record = tmp.path().join("anchors.md");
    std::fs::write(&record, "# Anchor link check\n\nFix the bug in link checks.\n").unwrap();
    let entries = ChangelogEntries::from_records(&load_records(&[record]));
    assert_eq!(entries.fixed, vec!["Anchor link check"]);

    let section =
        render_changelog_section("v1.1.0", NaiveDate::from_ymd_opt(2026, 6, 2).unwrap(), &entries);
    let changelog = prepend_to_changelog("# Changelog\n", &section).unwrap();
    assert!(changelog.contains("### Fixed\n\n- Anchor link check\n"));
    assert!(prepend_to_changelog(&changelog, &section).is_err());
}
