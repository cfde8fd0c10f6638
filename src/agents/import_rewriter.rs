use crate::agents::source_loader::{SourceFile, SourceLoader};
use crate::error::Result;
use crate::golang::is_within;
use crate::utils::fs::write_atomic;
use crate::utils::paths::{file_within_root, module_root};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Summary of one rewrite pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub files_scanned: usize,
    pub files_rewritten: Vec<PathBuf>,
    pub imports_rewritten: usize,
}

impl RewriteReport {
    pub fn is_empty(&self) -> bool {
        self.files_rewritten.is_empty()
    }
}

/// ImportRewriter moves every import of one module path onto another
pub struct ImportRewriter {
    project_root: PathBuf,
}

impl ImportRewriter {
    pub fn new<P: AsRef<Path>>(project_root: P) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    /// Rewrite imports of `old_path` (and its subpackages) to `new_path`.
    ///
    /// Files without a matching import are never written. Each changed file
    /// is replaced atomically; a failure aborts the pass and leaves earlier
    /// files rewritten.
    pub fn rewrite_imports(&self, old_path: &str, new_path: &str) -> Result<RewriteReport> {
        let root = module_root(&self.project_root)?;
        let files = SourceLoader::new(&root).load()?;
        let mut report = RewriteReport {
            files_scanned: files.len(),
            ..RewriteReport::default()
        };

        for file in files {
            let Some((source, count)) = rewrite_source(&file, old_path, new_path) else {
                continue;
            };

            let path = file_within_root(&file.path, &root)?;
            write_atomic(&path, source.as_bytes())?;
            info!("Rewrote {} import(s) in {}", count, file.path.display());

            report.imports_rewritten += count;
            report.files_rewritten.push(file.path);
        }

        Ok(report)
    }
}

/// The rewritten literal for `import_path`, or `None` when it does not
/// belong to `old_path`.
///
/// Matching is on whole path elements, so `example.com/mod` does not claim
/// `example.com/moduleX`. Imports already under `new_path` are left alone,
/// which keeps the rewrite idempotent when `new_path` nests inside
/// `old_path` (`mod` to `mod/v2`).
pub fn rewrite_import_path(import_path: &str, old_path: &str, new_path: &str) -> Option<String> {
    if !is_within(import_path, old_path) || is_within(import_path, new_path) {
        return None;
    }
    Some(format!("{}{}", new_path, &import_path[old_path.len()..]))
}

/// Splices rewritten literals into the file's text. Returns the new text and
/// the number of imports changed, or `None` if nothing matched.
fn rewrite_source(file: &SourceFile, old_path: &str, new_path: &str) -> Option<(String, usize)> {
    let mut output = String::with_capacity(file.source.len());
    let mut cursor = 0;
    let mut count = 0;

    for import in &file.imports {
        let Some(rewritten) = rewrite_import_path(&import.path, old_path, new_path) else {
            continue;
        };

        debug!(
            "{}:\n\t{}\n\t-> {}",
            file.path.display(),
            import.path,
            rewritten
        );
        output.push_str(&file.source[cursor..import.span.start]);
        output.push_str(&rewritten);
        cursor = import.span.end;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    output.push_str(&file.source[cursor..]);
    Some((output, count))
}
