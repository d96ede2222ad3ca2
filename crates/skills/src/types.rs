use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Where a skill was discovered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillSource {
    /// Project-local: `<cwd>/.skilldeck/skills/`
    Project,
    /// Personal: `~/.skilldeck/skills/`
    Personal,
    /// A configured or command-line corpus root.
    Corpus,
}

impl std::fmt::Display for SkillSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Personal => write!(f, "personal"),
            Self::Corpus => write!(f, "corpus"),
        }
    }
}

/// Lightweight metadata parsed from SKILL.md frontmatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMetadata {
    /// Skill name: lowercase, hyphens allowed, 1-64 chars.
    pub name: String,
    /// What the skill does and when to pick it; matched against task descriptions.
    #[serde(default)]
    pub description: String,
    /// SPDX license identifier.
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub version: Option<String>,
    /// Tools this skill may use. Accepts a YAML list or a comma/space separated string.
    #[serde(default, alias = "allowed-tools", deserialize_with = "string_or_list")]
    pub allowed_tools: Vec<String>,
    #[serde(default, alias = "keywords", deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
    /// Filesystem path to the skill directory.
    #[serde(skip_deserializing)]
    pub path: PathBuf,
    /// Where this skill was discovered.
    #[serde(skip_deserializing)]
    pub source: Option<SkillSource>,
}

/// Full skill content: metadata + markdown body.
/// Loaded on demand.
#[derive(Debug, Clone)]
pub struct SkillContent {
    pub metadata: SkillMetadata,
    pub body: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<StringOrList>::deserialize(deserializer)?;
    Ok(match value {
        None => Vec::new(),
        Some(StringOrList::Many(items)) => items,
        Some(StringOrList::One(s)) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

/// YAML reads `version: 1.0` as a float; keep it as text.
fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => format!("{f:?}"),
        }),
    )
}
