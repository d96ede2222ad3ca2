//! Configuration loading, validation, and env substitution.
//!
//! Config files: `skilldeck.toml`, `skilldeck.yaml`, `skilldeck.yml`, or `skilldeck.json`
//! Searched in `./` then `~/.config/skilldeck/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw file.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        config_dir, data_dir, discover_and_load, find_or_default_config_path, load_config,
        save_config, set_config_dir, set_data_dir,
    },
    schema::{
        DocsConfig, FeedbackConfig, LintConfig, MatchingConfig, SkilldeckConfig, SkillsConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult},
};
