use std::path::{Path, PathBuf};

use {async_trait::async_trait, skilldeck_config::SkillsConfig};

use crate::{
    parse,
    types::{SkillMetadata, SkillSource},
};

/// Discovers skills from filesystem paths.
#[async_trait]
pub trait SkillDiscoverer: Send + Sync {
    /// Scan configured paths and return metadata for all discovered skills.
    async fn discover(&self) -> anyhow::Result<Vec<SkillMetadata>>;
}

/// Default filesystem-based skill discoverer.
pub struct FsSkillDiscoverer {
    /// (path, source) pairs to scan, in priority order.
    search_paths: Vec<(PathBuf, SkillSource)>,
}

impl FsSkillDiscoverer {
    pub fn new(search_paths: Vec<(PathBuf, SkillSource)>) -> Self {
        Self { search_paths }
    }

    /// Build the default search paths: project, personal, then configured corpora.
    pub fn default_paths(cwd: &Path, config: &SkillsConfig) -> Vec<(PathBuf, SkillSource)> {
        let mut paths = Vec::new();
        if config.include_project {
            paths.push((cwd.join(".skilldeck/skills"), SkillSource::Project));
        }
        if config.include_personal {
            paths.push((
                skilldeck_config::data_dir().join("skills"),
                SkillSource::Personal,
            ));
        }
        for root in &config.search_paths {
            let root = if root.is_absolute() {
                root.clone()
            } else {
                cwd.join(root)
            };
            paths.push((root, SkillSource::Corpus));
        }
        paths
    }

    pub fn search_paths(&self) -> &[(PathBuf, SkillSource)] {
        &self.search_paths
    }
}

#[async_trait]
impl SkillDiscoverer for FsSkillDiscoverer {
    async fn discover(&self) -> anyhow::Result<Vec<SkillMetadata>> {
        let mut skills = Vec::new();

        for (base_path, source) in &self.search_paths {
            let mut found = Vec::new();
            for skill_dir in skill_dirs(base_path) {
                if let Some(meta) = read_metadata(&skill_dir, source).await {
                    found.push(meta);
                }
            }
            found.sort_by(|a, b| a.name.cmp(&b.name));
            tracing::debug!(
                path = %base_path.display(),
                %source,
                count = found.len(),
                "scanned skill path"
            );
            skills.extend(found);
        }

        Ok(skills)
    }
}

async fn read_metadata(skill_dir: &Path, source: &SkillSource) -> Option<SkillMetadata> {
    let skill_md = skill_dir.join("SKILL.md");
    let content = match tokio::fs::read_to_string(&skill_md).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(?skill_md, %e, "failed to read SKILL.md");
            return None;
        },
    };
    match parse::parse_metadata(&content, skill_dir) {
        Ok(mut meta) => {
            meta.source = Some(source.clone());
            Some(meta)
        },
        Err(e) => {
            tracing::warn!(?skill_dir, %e, "failed to parse SKILL.md");
            None
        },
    }
}

/// Skill directories under `base`.
///
/// A base that holds `SKILL.md` itself is a single skill; otherwise every
/// immediate child directory with a `SKILL.md` is one. Sorted by path.
pub fn skill_dirs(base: &Path) -> Vec<PathBuf> {
    if !base.is_dir() {
        return Vec::new();
    }
    if base.join("SKILL.md").is_file() {
        return vec![base.to_path_buf()];
    }

    let entries = match std::fs::read_dir(base) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(path = %base.display(), %e, "failed to read skill directory");
            return Vec::new();
        },
    };

    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_dir() && p.join("SKILL.md").is_file())
        .collect();
    dirs.sort();
    dirs
}

/// Like [`skill_dirs`], but also returns child directories missing `SKILL.md`
/// so the linter can report them. Hidden directories are skipped.
pub fn candidate_dirs(base: &Path) -> Vec<PathBuf> {
    if !base.is_dir() {
        return Vec::new();
    }
    if base.join("SKILL.md").is_file() {
        return vec![base.to_path_buf()];
    }
    let Ok(entries) = std::fs::read_dir(base) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| {
            p.is_dir()
                && !p
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'))
        })
        .collect();
    dirs.sort();
    dirs
}
