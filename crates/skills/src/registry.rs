use std::{collections::HashMap, path::Path};

use async_trait::async_trait;

use crate::{
    discover::SkillDiscoverer,
    parse,
    types::{SkillContent, SkillMetadata},
};

/// Registry of discovered skills, keyed by name.
#[async_trait]
pub trait SkillRegistry: Send + Sync {
    /// List metadata for all available skills, sorted by name.
    async fn list_skills(&self) -> anyhow::Result<Vec<SkillMetadata>>;

    /// Metadata for a single skill.
    async fn get(&self, name: &str) -> anyhow::Result<Option<SkillMetadata>>;

    /// Load the full content of a skill by name.
    async fn load_skill(&self, name: &str) -> anyhow::Result<SkillContent>;
}

/// In-memory registry backed by a discoverer.
#[derive(Default)]
pub struct InMemoryRegistry {
    skills: HashMap<String, SkillMetadata>,
}

impl InMemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the registry from a discoverer. The first occurrence of a
    /// name wins; discoverers return skills in priority order.
    pub async fn from_discoverer(discoverer: &dyn SkillDiscoverer) -> anyhow::Result<Self> {
        let mut registry = Self::new();
        for meta in discoverer.discover().await? {
            registry.insert(meta);
        }
        Ok(registry)
    }

    /// Add a skill unless one with the same name is already present.
    /// Returns `false` for a shadowed duplicate.
    pub fn insert(&mut self, meta: SkillMetadata) -> bool {
        if let Some(existing) = self.skills.get(&meta.name) {
            tracing::warn!(
                name = %meta.name,
                kept = %existing.path.display(),
                shadowed = %meta.path.display(),
                "duplicate skill name, keeping first"
            );
            return false;
        }
        self.skills.insert(meta.name.clone(), meta);
        true
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[async_trait]
impl SkillRegistry for InMemoryRegistry {
    async fn list_skills(&self) -> anyhow::Result<Vec<SkillMetadata>> {
        let mut skills: Vec<_> = self.skills.values().cloned().collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    async fn get(&self, name: &str) -> anyhow::Result<Option<SkillMetadata>> {
        Ok(self.skills.get(name).cloned())
    }

    async fn load_skill(&self, name: &str) -> anyhow::Result<SkillContent> {
        let meta = self
            .skills
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("skill '{}' not found", name))?;

        let mut content = load_skill_from_path(&meta.path).await?;
        content.metadata.source = meta.source.clone();
        Ok(content)
    }
}

/// Convenience: load a skill's full content given its path.
pub async fn load_skill_from_path(skill_dir: &Path) -> anyhow::Result<SkillContent> {
    let skill_md = skill_dir.join("SKILL.md");
    let content = tokio::fs::read_to_string(&skill_md)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", skill_md.display()))?;
    parse::parse_skill(&content, skill_dir)
}
