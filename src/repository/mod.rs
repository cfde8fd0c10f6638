use crate::error::Result;

pub mod factory;
pub use factory::RepositoryFactory;

/// A single probe: "does `module_path` resolve at `query_version`".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    pub module_path: String,
    pub query_version: String,
}

impl VersionCandidate {
    pub fn new(module_path: impl Into<String>, query_version: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            query_version: query_version.into(),
        }
    }

    /// Candidate for major line `major` under `prefix`, tagged `vN` as the
    /// major-version convention requires.
    pub fn major_line(prefix: &str, major: u64) -> Self {
        Self::new(format!("{prefix}/v{major}"), format!("v{major}"))
    }

    /// The `module@version` form accepted by the module oracle.
    pub fn query(&self) -> String {
        format!("{}@{}", self.module_path, self.query_version)
    }
}

/// Outcome of one probe, in the same position as its candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub version: String,
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn found(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            version: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Boundary to the module resolution oracle.
pub trait ModuleQuery {
    /// Resolves every candidate in one round trip. The returned results are
    /// positionally correlated with `candidates`.
    fn probe_batch(&self, candidates: &[VersionCandidate]) -> Result<Vec<ProbeResult>>;

    /// Resolves `module@version` to a concrete version string.
    fn query_version(&self, module_path: &str, version: &str) -> Result<String>;
}
