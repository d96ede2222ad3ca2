use std::path::Path;

use anyhow::{Context, bail};

use crate::types::{SkillContent, SkillMetadata};

/// Maximum skill name length in characters.
pub const MAX_NAME_LEN: usize = 64;

/// Validate a skill name: lowercase ASCII, digits, hyphens, 1-64 chars.
/// Colons are allowed for namespaced names (`plugin:skill`).
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == ':')
        && !name.starts_with(['-', ':'])
        && !name.ends_with(['-', ':'])
        && !name.contains("--")
        && !name.contains("::")
}

/// Parse a SKILL.md file into metadata only (frontmatter).
pub fn parse_metadata(content: &str, skill_dir: &Path) -> anyhow::Result<SkillMetadata> {
    Ok(parse_skill(content, skill_dir)?.metadata)
}

/// Parse a SKILL.md file into full content (metadata + body).
pub fn parse_skill(content: &str, skill_dir: &Path) -> anyhow::Result<SkillContent> {
    let (frontmatter, body) = split_frontmatter(content)?;
    let mut meta: SkillMetadata =
        serde_yaml::from_str(&frontmatter).context("invalid SKILL.md frontmatter")?;

    if !validate_name(&meta.name) {
        bail!(
            "invalid skill name '{}': must be 1-64 lowercase alphanumeric/hyphen chars",
            meta.name
        );
    }

    meta.path = skill_dir.to_path_buf();
    Ok(SkillContent {
        metadata: meta,
        body,
    })
}

/// Lenient parse used by the linter: returns the raw frontmatter mapping and
/// the body without validating any field.
pub fn parse_frontmatter_value(content: &str) -> anyhow::Result<(serde_yaml::Mapping, String)> {
    let (frontmatter, body) = split_frontmatter(content)?;
    if frontmatter.is_empty() {
        return Ok((serde_yaml::Mapping::new(), body));
    }
    match serde_yaml::from_str::<serde_yaml::Value>(&frontmatter)
        .context("frontmatter is not valid YAML")?
    {
        serde_yaml::Value::Mapping(map) => Ok((map, body)),
        serde_yaml::Value::Null => Ok((serde_yaml::Mapping::new(), body)),
        _ => bail!("frontmatter must be a YAML mapping"),
    }
}

/// Error raised by [`split_frontmatter`], kept distinct so the linter can
/// tell "no frontmatter" apart from "broken YAML".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterError {
    MissingOpening,
    MissingClosing,
}

impl std::fmt::Display for FrontmatterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingOpening => {
                write!(f, "SKILL.md must start with YAML frontmatter delimited by ---")
            },
            Self::MissingClosing => write!(f, "SKILL.md missing closing --- for frontmatter"),
        }
    }
}

impl std::error::Error for FrontmatterError {}

/// Split SKILL.md content at `---` delimiter lines into (frontmatter, body).
///
/// The opening line must be `---`; the front matter closes at the next line
/// that begins with `---`. A leading BOM is ignored.
pub fn split_frontmatter(content: &str) -> Result<(String, String), FrontmatterError> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    let Some(after_open) = trimmed.strip_prefix("---") else {
        return Err(FrontmatterError::MissingOpening);
    };
    // The opening line must be exactly `---` (trailing spaces allowed).
    let after_open = match after_open.find('\n') {
        Some(nl) if after_open[..nl].trim().is_empty() => &after_open[nl + 1..],
        None if after_open.trim().is_empty() => "",
        _ => return Err(FrontmatterError::MissingOpening),
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.starts_with("---") {
            let frontmatter = after_open[..offset].trim().to_string();
            let body = after_open[offset + line.len()..].trim().to_string();
            return Ok((frontmatter, body));
        }
        offset += line.len();
    }
    Err(FrontmatterError::MissingClosing)
}

/// 1-based line in the original file where the body starts.
pub fn body_start_line(content: &str) -> usize {
    let trimmed = content.trim_start_matches('\u{feff}');
    let mut delimiters = 0;
    for (idx, line) in trimmed.lines().enumerate() {
        let delimiter = if delimiters == 0 {
            line.trim_end() == "---"
        } else {
            line.starts_with("---")
        };
        if delimiter {
            delimiters += 1;
            if delimiters == 2 {
                // Skip blank lines, matching the `trim()` in split_frontmatter.
                let blank = trimmed
                    .lines()
                    .skip(idx + 1)
                    .take_while(|l| l.trim().is_empty())
                    .count();
                return idx + 2 + blank;
            }
        } else if delimiters == 0 && !line.trim().is_empty() {
            return 1;
        }
    }
    1
}
