//! Cross-checks between documentation and code: undocumented HTTP
//! endpoints, stale `def` examples, and broken relative links.

use std::{
    borrow::Cow,
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use {
    pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd},
    regex::Regex,
    serde::Serialize,
    skilldeck_config::DocsConfig,
    tracing::{debug, warn},
};

use crate::{
    Severity,
    error::Result,
    scan::{display_path, walk_files},
};

const API_DOC_CANDIDATES: &[&str] = &["API.md", "api.md", "docs/API.md"];

/// Flask/FastAPI decorators. Captures the method, then the path.
pub(crate) const PYTHON_ROUTE: &str =
    r#"(?i)@(?:app|router)\.(get|post|put|delete|patch)\(\s*['"]([^'"]+)['"]"#;
/// axum `.route("/path", get(..))`. Captures the path, then the method if inline.
pub(crate) const AXUM_ROUTE: &str =
    r#"\.route\(\s*"([^"]+)"(?:\s*,\s*(get|post|put|delete|patch)\b)?"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ApiMismatch,
    CodeExampleOutdated,
    BrokenLink,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiMismatch => write!(f, "api_mismatch"),
            Self::CodeExampleOutdated => write!(f, "code_example_outdated"),
            Self::BrokenLink => write!(f, "broken_link"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    /// File the issue was found in, relative to the project root.
    pub location: String,
    pub description: String,
    pub expected: String,
    pub actual: String,
    pub fix: String,
}

pub struct ConsistencyChecker {
    root: PathBuf,
    exclude_dirs: Vec<String>,
    max_api_issues: usize,
    max_example_blocks: usize,
    documented_endpoint: Regex,
    python_route: Regex,
    axum_route: Regex,
    python_def: Regex,
}

impl ConsistencyChecker {
    pub fn new(root: &Path, config: &DocsConfig) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            exclude_dirs: config.exclude_dirs.clone(),
            max_api_issues: config.max_api_issues,
            max_example_blocks: config.max_example_blocks,
            documented_endpoint: Regex::new(r"(?i)\b(?:GET|POST|PUT|DELETE|PATCH)\s+(/\S+)")?,
            python_route: Regex::new(PYTHON_ROUTE)?,
            axum_route: Regex::new(AXUM_ROUTE)?,
            python_def: Regex::new(r"\bdef\s+(\w+)")?,
        })
    }

    /// Run every check. Issues are sorted by severity, then location.
    pub fn check_all(&self) -> Result<Vec<ConsistencyIssue>> {
        let markdown = self.files(&["md"])?;
        let python = self.files(&["py"])?;

        let mut issues = Vec::new();
        self.check_api_docs(&python, &mut issues)?;
        self.check_code_examples(&markdown, &python, &mut issues);
        self.check_links(&markdown, &mut issues);

        issues.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.location.cmp(&b.location))
        });
        debug!(root = %self.root.display(), count = issues.len(), "consistency check complete");
        Ok(issues)
    }

    fn files(&self, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let extensions: Vec<String> = extensions.iter().map(|e| e.to_string()).collect();
        walk_files(&self.root, &extensions, &self.exclude_dirs)
    }

    fn check_api_docs(&self, python: &[PathBuf], issues: &mut Vec<ConsistencyIssue>) -> Result<()> {
        let Some(api_doc) = API_DOC_CANDIDATES
            .iter()
            .map(|name| self.root.join(name))
            .find(|p| p.is_file())
        else {
            return Ok(());
        };

        let doc = read_lossy(&api_doc).unwrap_or_default();
        let documented: BTreeSet<String> = self
            .documented_endpoint
            .captures_iter(&doc)
            .map(|c| c[1].to_string())
            .collect();

        let mut actual = BTreeSet::new();
        for path in python {
            if let Some(src) = read_lossy(path) {
                actual.extend(self.python_route.captures_iter(&src).map(|c| c[2].to_string()));
            }
        }
        for path in self.files(&["rs"])? {
            if let Some(src) = read_lossy(&path) {
                actual.extend(self.axum_route.captures_iter(&src).map(|c| c[1].to_string()));
            }
        }

        let location = display_path(&self.root, &api_doc);
        for endpoint in actual
            .difference(&documented)
            .take(self.max_api_issues)
        {
            issues.push(ConsistencyIssue {
                kind: IssueKind::ApiMismatch,
                severity: Severity::Major,
                location: location.clone(),
                description: format!("Endpoint {endpoint} exists in code but not documented"),
                expected: "Endpoint should be documented".into(),
                actual: "Not in API docs".into(),
                fix: format!("Add {endpoint} to API documentation"),
            });
        }
        Ok(())
    }

    fn check_code_examples(
        &self,
        markdown: &[PathBuf],
        python: &[PathBuf],
        issues: &mut Vec<ConsistencyIssue>,
    ) {
        let sources: Vec<String> = python.iter().filter_map(|p| read_lossy(p)).collect();
        let defined = |name: &str| {
            let needle = format!("def {name}(");
            sources.iter().any(|src| src.contains(&needle))
        };

        for path in markdown {
            let Some(content) = read_lossy(path) else {
                continue;
            };
            let location = display_path(&self.root, path);
            for block in fenced_blocks(&content)
                .into_iter()
                .take(self.max_example_blocks)
            {
                for caps in self.python_def.captures_iter(&block) {
                    let func = &caps[1];
                    if defined(func) {
                        continue;
                    }
                    issues.push(ConsistencyIssue {
                        kind: IssueKind::CodeExampleOutdated,
                        severity: Severity::Minor,
                        location: location.clone(),
                        description: format!("Function {func} may not exist"),
                        expected: "Function exists".into(),
                        actual: format!("{func} not found"),
                        fix: "Update example".into(),
                    });
                }
            }
        }
    }

    fn check_links(&self, markdown: &[PathBuf], issues: &mut Vec<ConsistencyIssue>) {
        for path in markdown {
            let Some(content) = read_lossy(path) else {
                continue;
            };
            let base = path.parent().unwrap_or(&self.root);
            for link in relative_links(&content) {
                let target = link_target(&link);
                if target.is_empty() || base.join(target.as_ref()).exists() {
                    continue;
                }
                issues.push(ConsistencyIssue {
                    kind: IssueKind::BrokenLink,
                    severity: Severity::Minor,
                    location: display_path(&self.root, path),
                    description: format!("Link to {link} may be broken"),
                    expected: "File exists".into(),
                    actual: "File not found".into(),
                    fix: "Fix or remove link".into(),
                });
            }
        }
    }
}

fn read_lossy(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file");
            None
        },
    }
}

/// Contents of fenced code blocks, in document order.
fn fenced_blocks(markdown: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;
    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                current = Some(String::new());
            },
            Event::Text(text) => {
                if let Some(block) = current.as_mut() {
                    block.push_str(&text);
                }
            },
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            },
            _ => {},
        }
    }
    blocks
}

/// File part of a link: fragment and query dropped, percent-escapes decoded.
fn link_target(link: &str) -> Cow<'_, str> {
    let end = link.find(['#', '?']).unwrap_or(link.len());
    let path = &link[..end];
    urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
}

/// Link and image targets that point at local files.
fn relative_links(markdown: &str) -> Vec<String> {
    Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. }) => {
                Some(dest_url.into_string())
            },
            _ => None,
        })
        .filter(|url| {
            !url.is_empty()
                && !url.starts_with("http")
                && !url.starts_with('#')
                && !url.starts_with("mailto:")
        })
        .collect()
}
