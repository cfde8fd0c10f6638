use crate::error::{GomajorError, Result};
use crate::golang::{ImportSpec, scan_imports};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// A Go source file together with the import literals found in its header.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
    pub imports: Vec<ImportSpec>,
}

/// SourceLoader collects every Go file that belongs to the module rooted at
/// `project_root`
pub struct SourceLoader {
    project_root: PathBuf,
}

impl SourceLoader {
    pub fn new<P: AsRef<Path>>(project_root: P) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    /// Load and scan all `.go` files, in path order.
    ///
    /// Mirrors the `go` tool's `./...` pattern: `vendor` and `testdata`
    /// directories, directories starting with `.` or `_`, and nested modules
    /// are skipped. Loading nothing at all is an error.
    pub fn load(&self) -> Result<Vec<SourceFile>> {
        let root = self.project_root.as_path();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !Self::is_excluded_dir(entry));

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                GomajorError::LoadFailure(format!("Failed to walk {}: {e}", root.display()))
            })?;

            if !entry.file_type().is_file() || !Self::is_go_file(&entry) {
                continue;
            }

            files.push(Self::load_file(entry.path())?);
        }

        if files.is_empty() {
            return Err(GomajorError::LoadFailure(format!(
                "no Go source files found under {}",
                root.display()
            )));
        }

        debug!("Loaded {} Go files from {}", files.len(), root.display());
        Ok(files)
    }

    fn load_file(path: &Path) -> Result<SourceFile> {
        let source = fs::read_to_string(path).map_err(|e| {
            GomajorError::LoadFailure(format!("Failed to read {}: {e}", path.display()))
        })?;

        let imports = scan_imports(&source).map_err(|e| {
            GomajorError::LoadFailure(format!("Failed to parse {}: {e}", path.display()))
        })?;

        Ok(SourceFile {
            path: path.to_path_buf(),
            source,
            imports,
        })
    }

    fn is_go_file(entry: &DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(".go"))
    }

    fn is_excluded_dir(entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        name.starts_with('.')
            || name.starts_with('_')
            || name == "vendor"
            || name == "testdata"
            || entry.path().join("go.mod").is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn loads_module_files_and_skips_excluded_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "go.mod", "module example.com/app\n");
        write(root, "main.go", "package main\n\nimport \"example.com/mod\"\n");
        write(root, "pkg/util/util.go", "package util\n");
        write(root, "pkg/util/util_test.go", "package util\n\nimport \"testing\"\n");
        write(root, "vendor/example.com/mod/mod.go", "package mod\n");
        write(root, "testdata/fixture.go", "not go at all");
        write(root, ".git/hook.go", "package hook\n");
        write(root, "_scratch/old.go", "package old\n");
        write(root, "tools/go.mod", "module example.com/app/tools\n");
        write(root, "tools/tools.go", "package tools\n");
        write(root, "README.md", "# app\n");

        let files = SourceLoader::new(root).load().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("main.go"),
                PathBuf::from("pkg/util/util.go"),
                PathBuf::from("pkg/util/util_test.go"),
            ]
        );
        assert_eq!(files[0].imports[0].path, "example.com/mod");
    }

    #[test]
    fn empty_tree_is_load_failure() {
        let dir = tempdir().unwrap();
        write(dir.path(), "go.mod", "module example.com/app\n");
        let err = SourceLoader::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, GomajorError::LoadFailure(_)));
    }

    #[test]
    fn malformed_file_is_load_failure() {
        let dir = tempdir().unwrap();
        write(dir.path(), "broken.go", "package main\nimport (\n\t\"fmt\n");
        let err = SourceLoader::new(dir.path()).load().unwrap_err();
        assert!(err.to_string().contains("broken.go"));
    }
}
