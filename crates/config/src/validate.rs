//! Configuration validation engine.
//!
//! Validates TOML configuration files against the known schema, detects
//! unknown/misspelled fields, and reports out-of-range values.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::schema::SkilldeckConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "range", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "lint.max_name_len"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration file.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

/// Represents the expected shape of the configuration schema.
enum KnownKeys {
    /// A struct with fixed field names.
    Struct(HashMap<&'static str, KnownKeys>),
    /// Scalar or list of scalars; stop recursion.
    Leaf,
}

/// Build the schema map mirroring every field in `schema.rs`.
fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    Struct(HashMap::from([
        (
            "skills",
            Struct(HashMap::from([
                ("search_paths", Leaf),
                ("include_project", Leaf),
                ("include_personal", Leaf),
            ])),
        ),
        (
            "lint",
            Struct(HashMap::from([
                ("max_description_len", Leaf),
                ("max_name_len", Leaf),
                ("require_name_matches_dir", Leaf),
                ("check_references", Leaf),
                ("reference_dirs", Leaf),
            ])),
        ),
        (
            "matching",
            Struct(HashMap::from([("min_score", Leaf), ("limit", Leaf)])),
        ),
        (
            "docs",
            Struct(HashMap::from([
                ("extensions", Leaf),
                ("exclude_dirs", Leaf),
                ("max_api_issues", Leaf),
                ("max_example_blocks", Leaf),
            ])),
        ),
        (
            "feedback",
            Struct(HashMap::from([
                ("github_api_base", Leaf),
                ("github_token", Leaf),
                ("issue_limit", Leaf),
            ])),
        ),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Find the best match for `needle` among `candidates` using Levenshtein
/// distance. Returns `Some(best)` if the distance is <= `max_distance`.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(needle, candidate);
        if d > 0 && d <= max_distance && best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
///
/// Only TOML files get unknown-field detection; YAML and JSON files are
/// checked for syntax and types.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => crate::loader::find_config_file(),
    };

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Info,
                category: "file-ref",
                path: String::new(),
                message: "no config file found; using defaults".into(),
            }],
            config_path: None,
        };
    };

    let mut result = match std::fs::read_to_string(actual_path) {
        Ok(content) => {
            let content = crate::env_subst::substitute_env(&content);
            let ext = actual_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("toml");
            match ext {
                "yaml" | "yml" => validate_parsed(serde_yaml::from_str(&content).map_err(|e| {
                    format!("YAML syntax or type error: {e}")
                })),
                "json" => validate_parsed(
                    serde_json::from_str(&content)
                        .map_err(|e| format!("JSON syntax or type error: {e}")),
                ),
                _ => validate_toml_str(&content),
            }
        },
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message: format!("failed to read config file: {e}"),
            }],
            config_path: None,
        },
    };
    result.config_path = Some(actual_path.clone());
    result
}

fn validate_parsed(parsed: Result<SkilldeckConfig, String>) -> ValidationResult {
    let mut diagnostics = Vec::new();
    match parsed {
        Ok(config) => check_semantics(&config, &mut diagnostics),
        Err(message) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "syntax",
            path: String::new(),
            message,
        }),
    }
    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Validate a TOML string without file-system side effects beyond the
/// `skills.search_paths` existence check.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let mut diagnostics = Vec::new();

    // 1. Syntax
    let toml_value: toml::Value = match toml::from_str(toml_str) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message: format!("TOML syntax error: {e}"),
            });
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    // 2. Unknown fields
    let schema = build_schema_map();
    check_unknown_fields(&toml_value, &schema, "", &mut diagnostics);

    // 3. Types, then semantics on the parsed config
    match toml::from_str::<SkilldeckConfig>(toml_str) {
        Ok(config) => check_semantics(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "type-error",
            path: String::new(),
            message: format!("type error: {e}"),
        }),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Walk the TOML value tree against the schema tree and flag unknown keys.
fn check_unknown_fields(
    value: &toml::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (toml::Value::Table(table), KnownKeys::Struct(fields)) = (value, schema) else {
        return;
    };

    let known_keys: Vec<&str> = fields.keys().copied().collect();
    for (key, child_value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(child_schema) = fields.get(key.as_str()) {
            check_unknown_fields(child_value, child_schema, &path, diagnostics);
            continue;
        }
        let level = if prefix.is_empty() {
            "at top level "
        } else {
            ""
        };
        let msg = match suggest(key, &known_keys, 3) {
            Some(s) => format!("unknown field {level}(did you mean \"{s}\"?)"),
            None => format!("unknown field {level}"),
        };
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "unknown-field",
            path,
            message: msg.trim().to_string(),
        });
    }
}

/// Range and reference checks on a successfully parsed config.
fn check_semantics(config: &SkilldeckConfig, diagnostics: &mut Vec<Diagnostic>) {
    if !(0.0..=2.0).contains(&config.matching.min_score) {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "range",
            path: "matching.min_score".into(),
            message: format!(
                "min_score {} is outside the reachable range 0.0..=2.0",
                config.matching.min_score
            ),
        });
    }

    if config.matching.limit == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "range",
            path: "matching.limit".into(),
            message: "limit is 0; `skills match` will never return results".into(),
        });
    }

    if config.lint.max_name_len == 0 || config.lint.max_name_len > 64 {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "range",
            path: "lint.max_name_len".into(),
            message: format!(
                "max_name_len {} is outside 1..=64; names are always capped at 64",
                config.lint.max_name_len
            ),
        });
    }

    if config.docs.extensions.is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "range",
            path: "docs.extensions".into(),
            message: "no documentation extensions configured; docs commands will find nothing"
                .into(),
        });
    }

    if !config.feedback.github_api_base.starts_with("http://")
        && !config.feedback.github_api_base.starts_with("https://")
    {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "type-error",
            path: "feedback.github_api_base".into(),
            message: format!(
                "github_api_base must be an http(s) URL, got \"{}\"",
                config.feedback.github_api_base
            ),
        });
    }

    for (idx, dir) in config.skills.search_paths.iter().enumerate() {
        if !dir.is_dir() {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                category: "file-ref",
                path: format!("skills.search_paths[{idx}]"),
                message: format!("directory not found: {}", dir.display()),
            });
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
