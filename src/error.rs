use thiserror::Error;

#[derive(Error, Debug)]
pub enum GomajorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Module not a known dependency: {0}")]
    NotADependency(String),

    #[error("No versions available for upgrade of {0}")]
    ResolutionExhausted(String),

    #[error("Go command failed: {0}")]
    TransportFailure(String),

    #[error("Failed to load source tree: {0}")]
    LoadFailure(String),

    #[error("Failed to write {path}: {reason}")]
    PersistFailure { path: String, reason: String },

    #[error("go.mod parsing failed: {0}")]
    ManifestParsing(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GomajorError {
    pub(crate) fn persist(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        GomajorError::PersistFailure {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GomajorError>;
