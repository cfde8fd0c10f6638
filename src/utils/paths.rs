use crate::error::{GomajorError, Result};
use std::path::{Path, PathBuf};

/// Canonical form of the directory holding a module.
pub fn module_root(path: &Path) -> Result<PathBuf> {
    let canonical = path.canonicalize().map_err(|e| {
        GomajorError::InvalidInput(format!("Invalid module directory '{}': {e}", path.display()))
    })?;

    if !canonical.is_dir() {
        return Err(GomajorError::InvalidInput(format!(
            "'{}' is not a directory",
            canonical.display()
        )));
    }
    Ok(canonical)
}

/// Resolves `file` and refuses it unless it lands under `root`, which must
/// already be canonical. Symlinks out of the module are caught here.
pub fn file_within_root(file: &Path, root: &Path) -> Result<PathBuf> {
    let canonical = file
        .canonicalize()
        .map_err(|e| GomajorError::persist(file, e))?;

    if !canonical.starts_with(root) {
        return Err(GomajorError::persist(
            file,
            format!("resolves outside the module root {}", root.display()),
        ));
    }
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn module_root_is_canonical_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("svc");
        fs::create_dir(&nested).unwrap();
        let root = module_root(&nested.join("..").join("svc")).unwrap();
        assert_eq!(root, nested.canonicalize().unwrap());
    }

    #[test]
    fn module_root_rejects_files_and_missing_paths() {
        let dir = tempdir().unwrap();
        let go_mod = dir.path().join("go.mod");
        fs::write(&go_mod, "module example.com/app\n").unwrap();

        for path in [go_mod, dir.path().join("missing")] {
            let err = module_root(&path).unwrap_err();
            assert!(matches!(err, GomajorError::InvalidInput(_)), "{}", path.display());
        }
    }

    #[test]
    fn accepts_file_inside_root() {
        let dir = tempdir().unwrap();
        let root = module_root(dir.path()).unwrap();
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::write(root.join("pkg/a.go"), "package pkg\n").unwrap();
        assert_eq!(
            file_within_root(&root.join("pkg/a.go"), &root).unwrap(),
            root.join("pkg/a.go")
        );
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlink_leaving_root() {
        let project = tempdir().unwrap();
        let other = tempdir().unwrap();
        let root = module_root(project.path()).unwrap();
        let outside = other.path().join("main.go");
        fs::write(&outside, "package main\n").unwrap();
        std::os::unix::fs::symlink(&outside, root.join("main.go")).unwrap();

        let err = file_within_root(&root.join("main.go"), &root).unwrap_err();
        assert!(matches!(err, GomajorError::PersistFailure { .. }));
    }
}
