use crate::cli::Cli;
use crate::error::{GomajorError, Result};
use crate::utils::paths::module_root;
use std::path::{Path, PathBuf};

/// Settings for one upgrade run, built once from the command line.
#[derive(Debug, Clone)]
pub struct UpgradeConfig {
    pub manifest_path: PathBuf,
    /// Directory holding the manifest; the source tree is loaded from here
    /// and `go` commands run here.
    pub project_root: PathBuf,
    pub verbose: bool,
    pub go_binary: PathBuf,
}

impl UpgradeConfig {
    pub fn new<P: AsRef<Path>>(manifest_path: P, verbose: bool) -> Result<Self> {
        let manifest_path = manifest_path.as_ref().to_path_buf();
        let parent = match manifest_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let project_root = module_root(&parent)?;

        let file_name = manifest_path.file_name().ok_or_else(|| {
            GomajorError::InvalidInput(format!(
                "Module file path '{}' does not name a file",
                manifest_path.display()
            ))
        })?;

        Ok(Self {
            manifest_path: project_root.join(file_name),
            project_root,
            verbose,
            go_binary: PathBuf::from("go"),
        })
    }

    pub fn with_go_binary<P: AsRef<Path>>(mut self, go_binary: P) -> Self {
        self.go_binary = go_binary.as_ref().to_path_buf();
        self
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self::new(&cli.file, cli.verbose)?.with_go_binary(&cli.go_binary))
    }
}
