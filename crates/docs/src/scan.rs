use std::path::{Path, PathBuf};

use {
    skilldeck_config::DocsConfig,
    tracing::{debug, warn},
    walkdir::WalkDir,
};

use crate::error::{Error, Result};

/// Finds documentation files under a project root.
pub struct DocScanner {
    root: PathBuf,
    extensions: Vec<String>,
    exclude_dirs: Vec<String>,
}

impl DocScanner {
    pub fn new(root: &Path, config: &DocsConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            extensions: config.extensions.clone(),
            exclude_dirs: config.exclude_dirs.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Documentation files, sorted by path.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let files = walk_files(&self.root, &self.extensions, &self.exclude_dirs)?;
        debug!(root = %self.root.display(), count = files.len(), "scanned documentation");
        Ok(files)
    }
}

/// Recursively collect files with one of `extensions` under `root`, pruning
/// any directory whose name is in `exclude_dirs`. Sorted by path.
///
/// Unreadable entries below the root are logged and skipped.
pub fn walk_files(
    root: &Path,
    extensions: &[String],
    exclude_dirs: &[String],
) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::message(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let walker = WalkDir::new(root).follow_links(false).into_iter();
    let mut files = Vec::new();
    for entry in walker.filter_entry(|e| {
        e.depth() == 0
            || !e.file_type().is_dir()
            || !e
                .file_name()
                .to_str()
                .is_some_and(|name| exclude_dirs.iter().any(|d| d == name))
    }) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            },
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let matches_ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)));
        if matches_ext {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// `path` relative to `root` when possible, for display in reports.
pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn scan_filters_extensions_and_excluded_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "README.md");
        touch(tmp.path(), "docs/guide.rst");
        touch(tmp.path(), "docs/notes.TXT");
        touch(tmp.path(), "src/main.rs");
        touch(tmp.path(), "node_modules/pkg/README.md");
        touch(tmp.path(), "docs/build/out.md");

        let files = DocScanner::new(tmp.path(), &DocsConfig::default())
            .scan()
            .unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| display_path(tmp.path(), p))
            .collect();
        assert_eq!(rel, vec!["README.md", "docs/guide.rst", "docs/notes.TXT"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = walk_files(Path::new("/nonexistent/project"), &["md".into()], &[]).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn root_named_like_excluded_dir_is_still_scanned() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("build");
        touch(&root, "README.md");
        let files = walk_files(&root, &["md".into()], &["build".into()]).unwrap();
        assert_eq!(files.len(), 1);
    }
}
