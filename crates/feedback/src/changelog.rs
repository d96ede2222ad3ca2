//! Changelog sections built from change records.

use std::{fmt::Write as _, path::Path};

use {chrono::NaiveDate, serde::Serialize, tracing::warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    Added,
    Fixed,
    /// Optimisations and performance work.
    Changed,
    Docs,
}

impl ChangeCategory {
    pub const ALL: [Self; 4] = [Self::Added, Self::Fixed, Self::Changed, Self::Docs];

    pub fn heading(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Fixed => "Fixed",
            Self::Changed => "Changed",
            Self::Docs => "Documentation",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Added => &["add", "new feature", "新增", "新功能"],
            Self::Fixed => &["fix", "bug", "修复"],
            Self::Changed => &["optimi", "perf", "优化", "性能"],
            Self::Docs => &["doc", "文档"],
        }
    }

    /// Every category whose keywords appear in `text`, case-insensitively.
    pub fn classify(text: &str) -> Vec<Self> {
        let lower = text.to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|c| c.keywords().iter().any(|k| lower.contains(k)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangelogEntries {
    pub added: Vec<String>,
    pub fixed: Vec<String>,
    pub changed: Vec<String>,
    pub docs: Vec<String>,
}

impl ChangelogEntries {
    pub fn get(&self, category: ChangeCategory) -> &[String] {
        match category {
            ChangeCategory::Added => &self.added,
            ChangeCategory::Fixed => &self.fixed,
            ChangeCategory::Changed => &self.changed,
            ChangeCategory::Docs => &self.docs,
        }
    }

    fn get_mut(&mut self, category: ChangeCategory) -> &mut Vec<String> {
        match category {
            ChangeCategory::Added => &mut self.added,
            ChangeCategory::Fixed => &mut self.fixed,
            ChangeCategory::Changed => &mut self.changed,
            ChangeCategory::Docs => &mut self.docs,
        }
    }

    /// File one record under each category it matches.
    pub fn add_record(&mut self, title: &str, content: &str) {
        for category in ChangeCategory::classify(content) {
            let list = self.get_mut(category);
            if !list.iter().any(|t| t == title) {
                list.push(title.to_string());
            }
        }
    }

    /// Classify `(title, content)` records.
    pub fn from_records(records: &[(String, String)]) -> Self {
        let mut entries = Self::default();
        for (title, content) in records {
            entries.add_record(title, content);
        }
        entries
    }
}

/// The record's first Markdown heading, else `fallback`.
pub fn record_title(content: &str, fallback: &str) -> String {
    content
        .lines()
        .find_map(|line| {
            let text = line.trim_start().trim_start_matches('#');
            (line.trim_start().starts_with('#') && text.starts_with(' '))
                .then(|| text.trim().to_string())
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| fallback.to_string())
}

/// Read change records as `(title, content)`, skipping unreadable files.
pub fn load_records<P: AsRef<Path>>(paths: &[P]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| {
            let path = path.as_ref();
            let content = match std::fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read change record");
                    return None;
                },
            };
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some((record_title(&content, &stem), content))
        })
        .collect()
}

fn version_header(version: &str) -> String {
    format!("## [{version}]")
}

pub fn render_changelog_section(
    version: &str,
    date: NaiveDate,
    entries: &ChangelogEntries,
) -> String {
    let mut md = format!("{} - {}\n", version_header(version), date.format("%Y-%m-%d"));
    for category in ChangeCategory::ALL {
        let _ = writeln!(md, "\n### {}\n", category.heading());
        let items = entries.get(category);
        if items.is_empty() {
            md.push_str("- None\n");
        }
        for item in items {
            let _ = writeln!(md, "- {item}");
        }
    }
    md
}

/// Insert `section` into an existing changelog.
///
/// The section lands before the first `## ` release header, else after the
/// `# ` title, else at the top. Fails when the section's version header is
/// already present.
pub fn prepend_to_changelog(existing: &str, section: &str) -> Result<String> {
    let header = section
        .lines()
        .next()
        .and_then(|line| line.find(']').map(|end| &line[..=end]))
        .filter(|h| h.starts_with("## ["))
        .ok_or_else(|| Error::message("changelog section must start with a `## [version]` header"))?;
    if existing.lines().any(|line| line.starts_with(header)) {
        return Err(Error::DuplicateVersion {
            header: header.to_string(),
        });
    }

    let section = section.trim_end();
    if existing.trim().is_empty() {
        return Ok(format!("# Changelog\n\n{section}\n"));
    }

    let mut offset = 0;
    let mut title_end = None;
    for line in existing.split_inclusive('\n') {
        if line.starts_with("## ") {
            let (head, tail) = existing.split_at(offset);
            return Ok(format!("{head}{section}\n\n{tail}"));
        }
        offset += line.len();
        if title_end.is_none() && line.starts_with("# ") {
            title_end = Some(offset);
        }
    }

    Ok(match title_end {
        Some(end) => {
            let (head, tail) = existing.split_at(end);
            let tail = tail.trim_start_matches('\n');
            let head = if head.ends_with('\n') {
                head.to_string()
            } else {
                format!("{head}\n")
            };
            if tail.is_empty() {
                format!("{head}\n{section}\n")
            } else {
                format!("{head}\n{section}\n\n{tail}")
            }
        },
        None => format!("{section}\n\n{existing}"),
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()
    }

    fn section(version: &str) -> String {
        render_changelog_section(version, date(), &ChangelogEntries::default())
    }

    #[rstest]
    #[case("Add batch lint", &[ChangeCategory::Added])]
    #[case("FIX crash on empty file", &[ChangeCategory::Fixed])]
    #[case("Optimise matcher; update docs", &[ChangeCategory::Changed, ChangeCategory::Docs])]
    #[case("修复 性能 问题", &[ChangeCategory::Fixed, ChangeCategory::Changed])]
    #[case("Refactor internals", &[])]
    fn classifies_by_keyword(#[case] text: &str, #[case] expected: &[ChangeCategory]) {
        assert_eq!(ChangeCategory::classify(text), expected);
    }

    #[test]
    fn entries_are_deduplicated_per_category() {
        let entries = ChangelogEntries::from_records(&[
            ("Lint fixes".into(), "fix lint bug".into()),
            ("Lint fixes".into(), "another fix".into()),
            ("Faster docs".into(), "optimise doc scan".into()),
        ]);
        assert_eq!(entries.fixed, vec!["Lint fixes"]);
        assert_eq!(entries.changed, vec!["Faster docs"]);
        assert_eq!(entries.docs, vec!["Faster docs"]);
        assert!(entries.added.is_empty());
    }

    #[test]
    fn title_prefers_first_heading() {
        assert_eq!(record_title("intro\n## Fix lint\n# Other\n", "stem"), "Fix lint");
        assert_eq!(record_title("#hashtag only\n", "stem"), "stem");
    }

    #[test]
    fn load_records_falls_back_to_file_stem() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("2026-05-fix.md");
        std::fs::write(&path, "fixed the watcher\n").unwrap();
        let records = load_records(&[path, tmp.path().join("missing.md")]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "2026-05-fix");
    }

    #[test]
    fn section_marks_empty_categories() {
        let entries = ChangelogEntries {
            added: vec!["Skill matcher".into()],
            ..Default::default()
        };
        let md = render_changelog_section("v1.1.0", date(), &entries);
        assert!(md.starts_with("## [v1.1.0] - 2026-05-20\n"));
        assert!(md.contains("### Added\n\n- Skill matcher\n"));
        assert!(md.contains("### Fixed\n\n- None\n"));
        assert!(md.contains("### Documentation\n\n- None\n"));
    }

    #[test]
    fn prepend_goes_before_latest_release() {
        let existing = "# Changelog\n\nAll notable changes.\n\n## [v1.0.0] - 2026-01-01\n\n- first\n";
        let out = prepend_to_changelog(existing, &section("v1.1.0")).unwrap();
        let new_at = out.find("## [v1.1.0]").unwrap();
        let old_at = out.find("## [v1.0.0]").unwrap();
        assert!(out.starts_with("# Changelog\n\nAll notable changes.\n\n"));
        assert!(new_at < old_at);
    }

    #[test]
    fn prepend_after_title_when_no_releases() {
        let out = prepend_to_changelog("# Changelog\n", &section("v0.1.0")).unwrap();
        assert!(out.starts_with("# Changelog\n\n## [v0.1.0] - 2026-05-20\n"));
    }

    #[test]
    fn prepend_into_empty_file_adds_title() {
        let out = prepend_to_changelog("", &section("v0.1.0")).unwrap();
        assert!(out.starts_with("# Changelog\n\n## [v0.1.0]"));
    }

    #[test]
    fn prepend_refuses_duplicate_version() {
        let existing = prepend_to_changelog("", &section("v0.1.0")).unwrap();
        let err = prepend_to_changelog(&existing, &section("v0.1.0")).unwrap_err();
        assert!(matches!(err, Error::DuplicateVersion { .. }));
        assert_eq!(err.to_string(), "changelog already contains ## [v0.1.0]");
    }
}
