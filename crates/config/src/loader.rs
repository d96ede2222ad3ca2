use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::SkilldeckConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "skilldeck.toml",
    "skilldeck.yaml",
    "skilldeck.yml",
    "skilldeck.json",
];

static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);
static DATA_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Override the user-global config directory (e.g. from `--config-dir`).
pub fn set_config_dir(dir: PathBuf) {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.lock() {
        *guard = Some(dir);
    }
}

/// Override the data directory (e.g. from `--data-dir`).
pub fn set_data_dir(dir: PathBuf) {
    if let Ok(mut guard) = DATA_DIR_OVERRIDE.lock() {
        *guard = Some(dir);
    }
}

fn override_of(slot: &Mutex<Option<PathBuf>>) -> Option<PathBuf> {
    slot.lock().ok().and_then(|g| g.clone())
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<SkilldeckConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./skilldeck.{toml,yaml,yml,json}` (project-local)
/// 2. `<config_dir>/skilldeck.{toml,yaml,yml,json}` (user-global)
///
/// Returns `SkilldeckConfig::default()` if no config file is found or the
/// file cannot be parsed.
pub fn discover_and_load() -> SkilldeckConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    SkilldeckConfig::default()
}

/// Find the first config file in standard locations.
pub(crate) fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/skilldeck/`),
/// honouring [`set_config_dir`].
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = override_of(&CONFIG_DIR_OVERRIDE) {
        return Some(dir);
    }
    directories::ProjectDirs::from("", "", "skilldeck").map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory (`~/.skilldeck/`), honouring [`set_data_dir`].
pub fn data_dir() -> PathBuf {
    if let Some(dir) = override_of(&DATA_DIR_OVERRIDE) {
        return dir;
    }
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".skilldeck"))
        .unwrap_or_else(|| PathBuf::from(".skilldeck"))
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skilldeck.toml")
}

/// Write `config` as TOML to `path`, replacing the file atomically.
///
/// An existing file is left alone unless `overwrite` is set.
pub fn save_config(config: &SkilldeckConfig, path: &Path, overwrite: bool) -> anyhow::Result<()> {
    if path.exists() && !overwrite {
        anyhow::bail!("{} already exists (use --force to replace it)", path.display());
    }
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("serialize config: {e}"))?;
    skilldeck_common::fs::write_atomic(path, &toml_str)?;
    debug!(path = %path.display(), "saved config");
    Ok(())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<SkilldeckConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_toml_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skilldeck.toml");
        std::fs::write(
            &path,
            "[matching]\nlimit = 3\nmin_score = 0.5\n[skills]\nsearch_paths = [\"/corpus\"]\n",
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.matching.limit, 3);
        assert_eq!(cfg.skills.search_paths, vec![PathBuf::from("/corpus")]);
    }

    #[test]
    fn load_yaml_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skilldeck.yaml");
        std::fs::write(&path, "docs:\n  max_api_issues: 9\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.docs.max_api_issues, 9);
        assert_eq!(cfg.docs.max_example_blocks, 3);
    }

    #[test]
    fn load_json_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skilldeck.json");
        std::fs::write(&path, r#"{"lint": {"check_references": false}}"#).unwrap();
        let cfg = load_config(&path).unwrap();
        assert!(!cfg.lint.check_references);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skilldeck.ini");
        std::fs::write(&path, "x=1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/skilldeck.toml")).is_err());
    }

    #[test]
    fn saved_defaults_load_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/skilldeck.toml");
        save_config(&SkilldeckConfig::default(), &path, false).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.matching.limit, SkilldeckConfig::default().matching.limit);
        assert_eq!(cfg.feedback.issue_limit, 50);
        assert!(cfg.feedback.github_token.is_none());
    }

    #[test]
    fn save_refuses_to_clobber_without_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skilldeck.toml");
        std::fs::write(&path, "[matching]\nlimit = 2\n").unwrap();

        let err = save_config(&SkilldeckConfig::default(), &path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(load_config(&path).unwrap().matching.limit, 2);

        save_config(&SkilldeckConfig::default(), &path, true).unwrap();
        assert_eq!(
            load_config(&path).unwrap().matching.limit,
            SkilldeckConfig::default().matching.limit
        );
    }

    #[test]
    fn data_dir_override_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        set_data_dir(tmp.path().to_path_buf());
        assert_eq!(data_dir(), tmp.path());
        *DATA_DIR_OVERRIDE.lock().unwrap() = None;
        assert_ne!(data_dir(), tmp.path());
    }
}
