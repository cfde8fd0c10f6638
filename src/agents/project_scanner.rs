use crate::config::UpgradeConfig;
use crate::error::{GomajorError, Result};
use std::path::PathBuf;

/// ProjectScannerAgent validates the project structure
pub struct ProjectScannerAgent<'a> {
    config: &'a UpgradeConfig,
}

impl<'a> ProjectScannerAgent<'a> {
    pub fn new(config: &'a UpgradeConfig) -> Self {
        Self { config }
    }

    /// Validates the project structure
    pub fn validate(&self) -> Result<ProjectInfo> {
        let manifest_path = &self.config.manifest_path;
        if !manifest_path.is_file() {
            return Err(GomajorError::InvalidInput(format!(
                "Module file {} not found",
                manifest_path.display()
            )));
        }

        Ok(ProjectInfo {
            project_root: self.config.project_root.clone(),
            manifest_path: manifest_path.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub project_root: PathBuf,
    pub manifest_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn accepts_project_with_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/app\n").unwrap();
        let config = UpgradeConfig::new(dir.path().join("go.mod"), false).unwrap();
        let info = ProjectScannerAgent::new(&config).validate().unwrap();
        assert_eq!(info.manifest_path, config.manifest_path);
    }

    #[test]
    fn rejects_missing_manifest() {
        let dir = tempdir().unwrap();
        let config = UpgradeConfig::new(dir.path().join("go.mod"), false).unwrap();
        let err = ProjectScannerAgent::new(&config).validate().unwrap_err();
        assert!(matches!(err, GomajorError::InvalidInput(_)));
    }
}
