use std::path::Path;

use serde::Serialize;

use crate::error::{Context, Result};

/// Suggested documentation work, bucketed by effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImprovementPlan {
    /// Hours.
    pub quick_wins: Vec<String>,
    /// Days.
    pub short_term: Vec<String>,
    /// Weeks.
    pub long_term: Vec<String>,
}

impl ImprovementPlan {
    pub fn is_empty(&self) -> bool {
        self.quick_wins.is_empty() && self.short_term.is_empty() && self.long_term.is_empty()
    }
}

const REQUIRED_DOCS: &[(&str, &str)] = &[
    ("API.md", "API documentation"),
    ("ARCHITECTURE.md", "Architecture documentation"),
    ("CONTRIBUTING.md", "Contributing guidelines"),
];

/// Inspect a project root and suggest documentation improvements.
pub fn suggest(root: &Path) -> Result<ImprovementPlan> {
    let mut plan = ImprovementPlan::default();
    check_readme(root, &mut plan)?;
    check_examples(root, &mut plan)?;
    check_structure(root, &mut plan);
    Ok(plan)
}

fn check_readme(root: &Path, plan: &mut ImprovementPlan) -> Result<()> {
    let readme = root.join("README.md");
    if !readme.exists() {
        plan.quick_wins
            .push("Create README.md with project overview".into());
        return Ok(());
    }

    let bytes =
        std::fs::read(&readme).with_context(|| format!("reading {}", readme.display()))?;
    let content = String::from_utf8_lossy(&bytes).to_lowercase();

    if !content.contains("install") {
        plan.quick_wins.push("Add installation instructions".into());
    }
    if !content.contains("usage") && !content.contains("example") {
        plan.quick_wins.push("Add usage examples".into());
    }
    if !content.contains("```") {
        plan.quick_wins.push("Add code examples".into());
    }
    if !content.contains("contribut") {
        plan.short_term.push("Add contributing guidelines".into());
    }
    Ok(())
}

fn check_examples(root: &Path, plan: &mut ImprovementPlan) -> Result<()> {
    let examples = root.join("examples");
    let has_examples = examples.is_dir()
        && std::fs::read_dir(&examples)
            .with_context(|| format!("reading {}", examples.display()))?
            .next()
            .is_some();
    if !has_examples {
        plan.short_term
            .push("Add examples directory with working examples".into());
    }
    Ok(())
}

fn check_structure(root: &Path, plan: &mut ImprovementPlan) {
    let docs = root.join("docs");
    if !docs.exists() {
        plan.short_term
            .push("Create docs/ directory for detailed documentation".into());
    }
    for (file, what) in REQUIRED_DOCS {
        if !docs.join(file).exists() && !root.join(file).exists() {
            plan.long_term.push(format!("Create {what}"));
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_project_gets_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = suggest(tmp.path()).unwrap();
        assert_eq!(plan.quick_wins, vec!["Create README.md with project overview"]);
        assert_eq!(plan.short_term, vec![
            "Add examples directory with working examples",
            "Create docs/ directory for detailed documentation",
        ]);
        assert_eq!(plan.long_term, vec![
            "Create API documentation",
            "Create Architecture documentation",
            "Create Contributing guidelines",
        ]);
    }

    #[test]
    fn readme_content_checks() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("README.md"), "# Tool\n\nInstall with cargo.\n").unwrap();
        let plan = suggest(tmp.path()).unwrap();
        assert_eq!(plan.quick_wins, vec!["Add usage examples", "Add code examples"]);
        assert_eq!(plan.short_term[0], "Add contributing guidelines");
    }

    #[test]
    fn complete_project_needs_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("README.md"),
            "Install it. Usage:\n```\nrun\n```\nContributing welcome.\n",
        )
        .unwrap();
        std::fs::create_dir_all(tmp.path().join("examples")).unwrap();
        std::fs::write(tmp.path().join("examples/basic.md"), "x").unwrap();
        std::fs::create_dir_all(tmp.path().join("docs")).unwrap();
        std::fs::write(tmp.path().join("docs/API.md"), "x").unwrap();
        std::fs::write(tmp.path().join("ARCHITECTURE.md"), "x").unwrap();
        std::fs::write(tmp.path().join("CONTRIBUTING.md"), "x").unwrap();

        assert!(suggest(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn empty_examples_dir_counts_as_missing() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("examples")).unwrap();
        let plan = suggest(tmp.path()).unwrap();
        assert!(
            plan.short_term
                .contains(&"Add examples directory with working examples".to_string())
        );
    }
}
