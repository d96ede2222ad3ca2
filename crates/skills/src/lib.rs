//! Skills system: discovery, parsing, registry, linting, and task matching.
//!
//! Skills are directories containing a `SKILL.md` file with YAML frontmatter
//! and markdown instructions. A corpus is a directory of such skills.

pub mod discover;
pub mod lint;
pub mod matcher;
pub mod parse;
pub mod registry;
pub mod types;
#[cfg(feature = "file-watcher")]
pub mod watcher;
