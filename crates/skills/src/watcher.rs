//! Filesystem watcher for skill directories.
//!
//! Watches corpus roots for SKILL.md create/modify/delete events so
//! `skills lint --watch` can re-run after an edit.

use std::path::{Path, PathBuf};

use {
    anyhow::Result,
    notify_debouncer_full::{
        DebounceEventResult, Debouncer, RecommendedCache, new_debouncer,
        notify::{EventKind, RecommendedWatcher, RecursiveMode},
    },
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

const DEBOUNCE: std::time::Duration = std::time::Duration::from_millis(500);

/// Events emitted by the skill watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillWatchEvent {
    /// One or more SKILL.md files were created, modified, or deleted.
    Changed { paths: Vec<PathBuf> },
}

/// Watches skill directories for SKILL.md changes with debouncing.
pub struct SkillWatcher {
    debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
    watched: Vec<PathBuf>,
}

impl SkillWatcher {
    /// Start watching the given directories. Returns the watcher and a receiver for events.
    ///
    /// The watcher must be kept alive (not dropped) for events to continue.
    /// Directories that do not exist are skipped.
    pub fn start(dirs: Vec<PathBuf>) -> Result<(Self, mpsc::UnboundedReceiver<SkillWatchEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        let debouncer = new_debouncer(DEBOUNCE, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let mut paths: Vec<PathBuf> = events
                        .iter()
                        .filter(|event| is_relevant_kind(&event.kind))
                        .flat_map(|event| event.paths.iter())
                        .filter(|path| is_skill_file(path))
                        .cloned()
                        .collect();
                    paths.sort();
                    paths.dedup();
                    if !paths.is_empty() {
                        debug!(count = paths.len(), "skill watcher event");
                        let _ = tx.send(SkillWatchEvent::Changed { paths });
                    }
                },
                Err(errors) => {
                    for e in errors {
                        warn!(error = %e, "skill watcher error");
                    }
                },
            }
        })?;

        let mut watcher = Self {
            debouncer,
            watched: Vec::new(),
        };

        for dir in dirs {
            if dir.exists() {
                watcher.debouncer.watch(&dir, RecursiveMode::Recursive)?;
                info!(dir = %dir.display(), "skill watcher: watching directory");
                watcher.watched.push(dir);
            } else {
                debug!(dir = %dir.display(), "skill watcher: skipping missing directory");
            }
        }

        Ok((watcher, rx))
    }

    /// Directories actually being watched.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

fn is_skill_file(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some("SKILL.md")
}

fn is_relevant_kind(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        notify_debouncer_full::notify::event::{AccessKind, CreateKind},
    };

    #[test]
    fn filters_skill_files() {
        assert!(is_skill_file(Path::new("/corpus/a/SKILL.md")));
        assert!(!is_skill_file(Path::new("/corpus/a/README.md")));
        assert!(!is_skill_file(Path::new("/corpus/a/skill.md")));
    }

    #[test]
    fn filters_event_kinds() {
        assert!(is_relevant_kind(&EventKind::Create(CreateKind::File)));
        assert!(!is_relevant_kind(&EventKind::Access(AccessKind::Any)));
    }

    #[tokio::test]
    async fn skips_missing_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let (watcher, _rx) = SkillWatcher::start(vec![
            tmp.path().to_path_buf(),
            tmp.path().join("missing"),
        ])
        .unwrap();
        assert_eq!(watcher.watched(), [tmp.path().to_path_buf()]);
    }
}
