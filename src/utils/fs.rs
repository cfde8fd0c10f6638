use crate::error::{GomajorError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replaces `path` with `contents` atomically.
///
/// The bytes go to a temp file in the same directory which is renamed over
/// the target once fully written; the original permissions are carried over.
/// On any failure the temp file is removed and the target is left untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| GomajorError::persist(path, e))?;
    tmp.write_all(contents)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| GomajorError::persist(path, e))?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), metadata.permissions())
            .map_err(|e| GomajorError::persist(path, e))?;
    }

    tmp.persist(path)
        .map_err(|e| GomajorError::persist(path, e.error))?;
    Ok(())
}
