//! Skeleton README, API and architecture documents built from what can be
//! detected in a project: manifests, examples, HTTP routes and top-level
//! component directories.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use {
    chrono::NaiveDateTime,
    regex::Regex,
    serde::Serialize,
    skilldeck_config::DocsConfig,
    tracing::{debug, info, warn},
};

use crate::{
    consistency::{AXUM_ROUTE, PYTHON_ROUTE},
    error::Result,
    scan::{display_path, walk_files},
};

const MAX_ENDPOINTS: usize = 20;
const EXAMPLE_PREVIEW_CHARS: usize = 1000;
const COMPONENT_DIRS: &[&str] = &["src", "app", "services", "api", "web", "client", "server"];
const DEFAULT_COMPONENTS: &[&str] = &["API", "Service", "Database"];

/// Manifest files and the command that installs their dependencies.
const INSTALL_STEPS: &[(&str, &str)] = &[
    ("package.json", "npm install"),
    ("requirements.txt", "pip install -r requirements.txt"),
    ("setup.py", "pip install ."),
    ("pyproject.toml", "pip install ."),
    ("Cargo.toml", "cargo build"),
    ("go.mod", "go mod download"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    Readme,
    Api,
    Architecture,
}

impl DocKind {
    pub const ALL: [Self; 3] = [Self::Readme, Self::Api, Self::Architecture];

    /// Location relative to the output directory.
    pub fn relative_path(self) -> &'static str {
        match self {
            Self::Readme => "README.md",
            Self::Api => "docs/API.md",
            Self::Architecture => "docs/ARCHITECTURE.md",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub method: String,
    pub path: String,
    /// Source file, relative to the project root.
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageExample {
    /// Fence language, taken from the file extension.
    pub language: String,
    pub content: String,
}

/// What the generator could learn about a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectFacts {
    pub name: String,
    pub description: Option<String>,
    pub install_steps: Vec<String>,
    pub usage_example: Option<UsageExample>,
    pub endpoints: Vec<Endpoint>,
    pub components: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDoc {
    pub kind: DocKind,
    pub path: PathBuf,
    /// False when the file already existed and was left alone.
    pub written: bool,
}

pub struct DocsGenerator {
    root: PathBuf,
    exclude_dirs: Vec<String>,
    python_route: Regex,
    axum_route: Regex,
    setup_description: Regex,
}

impl DocsGenerator {
    pub fn new(root: &Path, config: &DocsConfig) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            exclude_dirs: config.exclude_dirs.clone(),
            python_route: Regex::new(PYTHON_ROUTE)?,
            axum_route: Regex::new(AXUM_ROUTE)?,
            setup_description: Regex::new(r#"description\s*=\s*['"]([^'"]+)['"]"#)?,
        })
    }

    pub fn facts(&self) -> Result<ProjectFacts> {
        let name = self
            .root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".into());

        Ok(ProjectFacts {
            name,
            description: self.description(),
            install_steps: self.install_steps(),
            usage_example: self.usage_example(),
            endpoints: self.endpoints()?,
            components: self.components(),
        })
    }

    /// Render `kinds` into `output_dir` (the project root when `None`).
    ///
    /// Existing files are kept unless `overwrite` is set.
    pub fn generate(
        &self,
        kinds: &[DocKind],
        output_dir: Option<&Path>,
        overwrite: bool,
        now: NaiveDateTime,
    ) -> Result<Vec<GeneratedDoc>> {
        let facts = self.facts()?;
        let target = output_dir.unwrap_or(&self.root);
        let mut generated = Vec::with_capacity(kinds.len());

        for &kind in kinds {
            let path = target.join(kind.relative_path());
            if path.exists() && !overwrite {
                debug!(path = %path.display(), "keeping existing document");
                generated.push(GeneratedDoc {
                    kind,
                    path,
                    written: false,
                });
                continue;
            }
            let content = match kind {
                DocKind::Readme => render_readme(&facts),
                DocKind::Api => render_api_doc(&facts, now),
                DocKind::Architecture => render_architecture_doc(&facts, now),
            };
            skilldeck_common::fs::write_atomic(&path, &content)?;
            info!(path = %path.display(), "generated document");
            generated.push(GeneratedDoc {
                kind,
                path,
                written: true,
            });
        }
        Ok(generated)
    }

    fn read_manifest(&self, name: &str) -> Option<String> {
        let path = self.root.join(name);
        if !path.is_file() {
            return None;
        }
        match skilldeck_common::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(error = %e, "failed to read manifest");
                None
            },
        }
    }

    fn description(&self) -> Option<String> {
        let from_package_json = || {
            let raw = self.read_manifest("package.json")?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .map_err(|e| warn!(error = %e, "invalid package.json"))
                .ok()?;
            value.get("description")?.as_str().map(str::to_string)
        };
        let from_setup_py = || {
            let raw = self.read_manifest("setup.py")?;
            self.setup_description
                .captures(&raw)
                .map(|c| c[1].to_string())
        };
        let from_cargo_toml = || {
            let raw = self.read_manifest("Cargo.toml")?;
            let value: toml::Value = toml::from_str(&raw)
                .map_err(|e| warn!(error = %e, "invalid Cargo.toml"))
                .ok()?;
            value
                .get("package")?
                .get("description")?
                .as_str()
                .map(str::to_string)
        };

        from_package_json()
            .or_else(from_setup_py)
            .or_else(from_cargo_toml)
            .filter(|d| !d.trim().is_empty())
    }

    fn install_steps(&self) -> Vec<String> {
        let mut steps: Vec<String> = Vec::new();
        for (manifest, step) in INSTALL_STEPS {
            if self.root.join(manifest).is_file() && !steps.iter().any(|s| s == step) {
                steps.push((*step).to_string());
            }
        }
        steps
    }

    /// Opening of the first file in `examples/`, by name.
    fn usage_example(&self) -> Option<UsageExample> {
        let dir = self.root.join("examples");
        let entries = std::fs::read_dir(&dir).ok()?;
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        files.into_iter().find_map(|path| {
            let bytes = std::fs::read(&path)
                .map_err(|e| warn!(path = %path.display(), error = %e, "failed to read example"))
                .ok()?;
            let content: String = String::from_utf8_lossy(&bytes)
                .chars()
                .take(EXAMPLE_PREVIEW_CHARS)
                .collect();
            let language = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_string();
            Some(UsageExample { language, content })
        })
    }

    fn endpoints(&self) -> Result<Vec<Endpoint>> {
        let sources = walk_files(
            &self.root,
            &["py".to_string(), "rs".to_string()],
            &self.exclude_dirs,
        )?;

        let mut endpoints = Vec::new();
        for path in sources {
            let Ok(src) = std::fs::read_to_string(&path) else {
                continue;
            };
            let file = display_path(&self.root, &path);
            let is_python = path.extension().is_some_and(|e| e == "py");
            if is_python {
                for caps in self.python_route.captures_iter(&src) {
                    endpoints.push(Endpoint {
                        method: caps[1].to_uppercase(),
                        path: caps[2].to_string(),
                        file: file.clone(),
                    });
                }
            } else {
                for caps in self.axum_route.captures_iter(&src) {
                    endpoints.push(Endpoint {
                        method: caps
                            .get(2)
                            .map_or_else(|| "GET".to_string(), |m| m.as_str().to_uppercase()),
                        path: caps[1].to_string(),
                        file: file.clone(),
                    });
                }
            }
            if endpoints.len() >= MAX_ENDPOINTS {
                break;
            }
        }
        endpoints.truncate(MAX_ENDPOINTS);
        Ok(endpoints)
    }

    fn components(&self) -> Vec<String> {
        let found: Vec<String> = COMPONENT_DIRS
            .iter()
            .filter(|name| self.root.join(name).is_dir())
            .map(|name| title_case(name))
            .collect();
        if found.is_empty() {
            DEFAULT_COMPONENTS.iter().map(|c| c.to_string()).collect()
        } else {
            found
        }
    }
}

/// `my-cool_app` becomes `My Cool_App`.
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(if c == '-' { ' ' } else { c });
            word_start = true;
        }
    }
    out
}

pub fn render_readme(facts: &ProjectFacts) -> String {
    let install = if facts.install_steps.is_empty() {
        "# Clone and install\ngit clone <repository-url>".to_string()
    } else {
        facts.install_steps.join("\n")
    };

    let mut md = format!("# {}\n\n", title_case(&facts.name));
    let _ = write!(md, "## Quick Start\n\n```bash\n{install}\n```\n\n");
    let _ = write!(
        md,
        "## About\n\n{}\n\n",
        facts
            .description
            .as_deref()
            .unwrap_or("A brief description of the project goes here.")
    );
    md.push_str("## Features\n\n- Feature 1\n- Feature 2\n- Feature 3\n\n");
    let _ = write!(md, "## Installation\n\n```bash\n{install}\n```\n\n");

    md.push_str("## Usage\n\n");
    match &facts.usage_example {
        Some(example) => {
            let _ = write!(
                md,
                "```{}\n{}\n```\n\n",
                example.language,
                example.content.trim_end()
            );
        },
        None => md.push_str("```\n# Add usage examples here\n```\n\n"),
    }

    md.push_str(
        "## Documentation\n\n\
         - [API Reference](docs/API.md)\n\
         - [Architecture](docs/ARCHITECTURE.md)\n\n\
         ## Development\n\n\
         ```bash\n# Add development setup steps here\n```\n\n\
         ## Contributing\n\n\
         Contributions are welcome. Please read the contributing guidelines first.\n\n\
         ## License\n\n\
         See the LICENSE file for details.\n",
    );
    md
}

pub fn render_api_doc(facts: &ProjectFacts, generated_at: NaiveDateTime) -> String {
    let mut md = String::from("# API Documentation\n\n");
    let _ = writeln!(md, "**Generated:** {}\n", generated_at.format("%Y-%m-%d %H:%M:%S"));
    md.push_str(
        "## Overview\n\n\
         This document describes the API endpoints available in this project.\n\n\
         ## Base URL\n\n```\n{base_url}\n```\n\n\
         ## Authentication\n\n{Authentication method and examples}\n\n\
         ## Endpoints\n",
    );

    if facts.endpoints.is_empty() {
        md.push_str("\n*No API endpoints detected. Add API documentation manually.*\n");
        return md;
    }
    for endpoint in &facts.endpoints {
        let _ = write!(
            md,
            "\n### {} `{}`\n\n\
             Defined in `{}`.\n\n\
             **Parameters:**\n\n\
             | Name | Type | Required | Description |\n\
             |------|------|----------|-------------|\n\
             | - | - | - | - |\n\n\
             **Response:**\n\n```json\n{{}}\n```\n",
            endpoint.method, endpoint.path, endpoint.file
        );
    }
    md
}

pub fn render_architecture_doc(facts: &ProjectFacts, generated_at: NaiveDateTime) -> String {
    let mut md = String::from("# Architecture Documentation\n\n");
    let _ = writeln!(md, "**Generated:** {}\n", generated_at.format("%Y-%m-%d %H:%M:%S"));
    md.push_str(
        "## System Overview\n\n{High-level system description}\n\n\
         ## Architecture Diagram\n\n\
         ```mermaid\ngraph TB\n    A[Client] --> B[API Gateway]\n    \
         B --> C[Service Layer]\n    C --> D[Data Layer]\n```\n\n\
         ## Components\n",
    );
    for component in &facts.components {
        let _ = write!(
            md,
            "\n### {component}\n\n\
             **Purpose:** {{Component purpose}}\n\n\
             **Responsibilities:**\n- {{Responsibility 1}}\n- {{Responsibility 2}}\n\n\
             **Technologies:** {{Technologies}}\n"
        );
    }
    md.push_str(
        "\n## Data Flow\n\n{Data flow description}\n\n\
         ## Technology Stack\n\n\
         | Layer | Technology | Version |\n\
         |-------|------------|---------|\n\
         | Frontend | | |\n| Backend | | |\n| Database | | |\n\n\
         ## Design Decisions\n\n\
         ### Decision: {Decision}\n\n\
         **Context:** {Why this decision was needed}\n\n\
         **Decision:** {Chosen option}\n\n\
         **Consequences:** {Impact}\n",
    );
    md
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, chrono::NaiveDate, rstest::rstest};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn generator(root: &Path) -> DocsGenerator {
        DocsGenerator::new(root, &DocsConfig::default()).unwrap()
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[rstest]
    #[case::npm(
        "package.json",
        r#"{"name": "web", "description": "A web app"}"#,
        "npm install",
        Some("A web app")
    )]
    #[case::setup_py(
        "setup.py",
        "setup(name='tool', description='A python tool')",
        "pip install .",
        Some("A python tool")
    )]
    #[case::pyproject("pyproject.toml", "[project]\nname = \"tool\"\n", "pip install .", None)]
    #[case::requirements("requirements.txt", "flask\n", "pip install -r requirements.txt", None)]
    #[case::cargo(
        "Cargo.toml",
        "[package]\nname = \"crate\"\ndescription = \"A rust crate\"\n",
        "cargo build",
        Some("A rust crate")
    )]
    #[case::go_mod("go.mod", "module example.com/svc\n", "go mod download", None)]
    fn manifest_drives_install_and_description(
        #[case] manifest: &str,
        #[case] content: &str,
        #[case] step: &str,
        #[case] description: Option<&str>,
    ) {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), manifest, content);
        let facts = generator(tmp.path()).facts().unwrap();
        assert_eq!(facts.install_steps, vec![step]);
        assert_eq!(facts.description.as_deref(), description);

        let readme = render_readme(&facts);
        assert!(readme.contains(&format!("```bash\n{step}\n```")));
    }

    #[test]
    fn setup_py_and_pyproject_share_one_step() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "setup.py", "setup()");
        write(tmp.path(), "pyproject.toml", "");
        write(tmp.path(), "package.json", "{}");
        let facts = generator(tmp.path()).facts().unwrap();
        assert_eq!(facts.install_steps, vec!["npm install", "pip install ."]);
    }

    #[test]
    fn no_manifest_falls_back_to_clone_hint() {
        let tmp = tempfile::tempdir().unwrap();
        let facts = generator(tmp.path()).facts().unwrap();
        assert!(facts.install_steps.is_empty());
        assert!(facts.description.is_none());
        let readme = render_readme(&facts);
        assert!(readme.contains("git clone <repository-url>"));
        assert!(readme.contains("A brief description of the project goes here."));
    }

    #[test]
    fn first_example_file_becomes_usage() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "examples/b_second.py", "print('second')\n");
        write(tmp.path(), "examples/a_first.py", "print('first')\n");
        let facts = generator(tmp.path()).facts().unwrap();
        let example = facts.usage_example.unwrap();
        assert_eq!(example.language, "py");
        assert_eq!(example.content, "print('first')\n");
    }

    #[test]
    fn long_examples_are_cut() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "examples/long.txt", &"é".repeat(1500));
        let example = generator(tmp.path()).facts().unwrap().usage_example.unwrap();
        assert_eq!(example.content.chars().count(), EXAMPLE_PREVIEW_CHARS);
    }

    #[test]
    fn endpoints_come_from_python_and_axum_routes() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "app.py",
            "@app.get('/users')\ndef users(): ...\n@router.POST(\"/orders\")\n",
        );
        write(
            tmp.path(),
            "src/main.rs",
            "Router::new().route(\"/health\", get(health)).route(\"/items\", post(add))",
        );
        let facts = generator(tmp.path()).facts().unwrap();
        let found: Vec<_> = facts
            .endpoints
            .iter()
            .map(|e| (e.method.as_str(), e.path.as_str(), e.file.as_str()))
            .collect();
        assert_eq!(found, vec![
            ("GET", "/users", "app.py"),
            ("POST", "/orders", "app.py"),
            ("GET", "/health", "src/main.rs"),
            ("POST", "/items", "src/main.rs"),
        ]);

        let api = render_api_doc(&facts, at());
        assert!(api.contains("**Generated:** 2026-03-01 09:30:00"));
        assert!(api.contains("### POST `/orders`"));
        assert!(api.contains("Defined in `src/main.rs`."));
    }

    #[test]
    fn endpoints_are_capped() {
        let tmp = tempfile::tempdir().unwrap();
        let routes: String = (0..30)
            .map(|i| format!("@app.get('/r{i}')\n"))
            .collect();
        write(tmp.path(), "app.py", &routes);
        let facts = generator(tmp.path()).facts().unwrap();
        assert_eq!(facts.endpoints.len(), MAX_ENDPOINTS);
    }

    #[test]
    fn api_doc_without_endpoints_says_so() {
        let api = render_api_doc(&ProjectFacts::default(), at());
        assert!(api.contains("*No API endpoints detected."));
    }

    #[test]
    fn components_follow_known_directories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("server")).unwrap();
        std::fs::create_dir_all(tmp.path().join("web")).unwrap();
        std::fs::create_dir_all(tmp.path().join("misc")).unwrap();
        let facts = generator(tmp.path()).facts().unwrap();
        assert_eq!(facts.components, vec!["Web", "Server"]);
        let arch = render_architecture_doc(&facts, at());
        assert!(arch.contains("### Web"));
        assert!(arch.contains("### Server"));
        assert!(!arch.contains("### Misc"));
    }

    #[test]
    fn components_default_when_none_found() {
        let tmp = tempfile::tempdir().unwrap();
        let facts = generator(tmp.path()).facts().unwrap();
        assert_eq!(facts.components, vec!["API", "Service", "Database"]);
    }

    #[rstest]
    #[case("docs-improver", "Docs Improver")]
    #[case("skill_manager", "Skill_Manager")]
    #[case("API", "Api")]
    fn titles_from_directory_names(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(title_case(name), expected);
    }

    #[test]
    fn generate_writes_all_three_documents() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "Cargo.toml", "[package]\nname = \"x\"\n");
        let docs = generator(tmp.path())
            .generate(&DocKind::ALL, None, false, at())
            .unwrap();
        assert_eq!(docs.len(), 3);
        assert!(docs.iter().all(|d| d.written));
        for kind in DocKind::ALL {
            assert!(tmp.path().join(kind.relative_path()).is_file());
        }
        let readme = std::fs::read_to_string(tmp.path().join("README.md")).unwrap();
        assert!(readme.contains("cargo build"));
    }

    #[test]
    fn generate_keeps_existing_files_unless_overwriting() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "README.md", "# Hand written\n");
        let generator = generator(tmp.path());

        let docs = generator
            .generate(&[DocKind::Readme], None, false, at())
            .unwrap();
        assert!(!docs[0].written);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("README.md")).unwrap(),
            "# Hand written\n"
        );

        let docs = generator
            .generate(&[DocKind::Readme], None, true, at())
            .unwrap();
        assert!(docs[0].written);
        let readme = std::fs::read_to_string(tmp.path().join("README.md")).unwrap();
        assert!(readme.contains("## Quick Start"));
    }

    #[test]
    fn generate_into_separate_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let docs = generator(tmp.path())
            .generate(&[DocKind::Api], Some(&out), false, at())
            .unwrap();
        assert_eq!(docs[0].path, out.join("docs/API.md"));
        assert!(out.join("docs/API.md").is_file());
        assert!(!tmp.path().join("docs/API.md").exists());
    }
}
