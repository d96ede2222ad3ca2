//! Small filesystem helpers shared by the report writers.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Read a UTF-8 file, attaching the path to any I/O error.
pub fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::file(path, e))
}

/// Write `content` atomically via a sibling temp file + rename.
///
/// Parent directories are created when missing.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::message(format!("not a file path: {}", path.display())))?;
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    std::fs::write(&tmp, content).map_err(|e| Error::file(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| Error::file(path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}
