use crate::error::{GomajorError, Result};
use crate::repository::{ModuleQuery, ProbeResult, VersionCandidate};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Module oracle backed by the `go` tool (`go list -m`).
pub struct GoCommand {
    go_binary: PathBuf,
    project_path: PathBuf,
}

impl GoCommand {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(go_binary: P, project_path: Q) -> Self {
        Self {
            go_binary: go_binary.as_ref().to_path_buf(),
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    fn run_go(&self, args: &[String]) -> Result<Output> {
        debug!("Executing: {} {}", self.go_binary.display(), args.join(" "));

        Command::new(&self.go_binary)
            .current_dir(&self.project_path)
            .args(args)
            .output()
            .map_err(|e| {
                GomajorError::TransportFailure(format!(
                    "Failed to execute '{} {}': {e}",
                    self.go_binary.display(),
                    args.join(" ")
                ))
            })
    }

    fn ensure_success(output: &Output, command: &str) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        Err(GomajorError::TransportFailure(if stderr.is_empty() {
            format!(
                "'{command}' exited with code {}",
                output.status.code().unwrap_or(-1)
            )
        } else {
            format!("'{command}' failed: {stderr}")
        }))
    }
}

impl ModuleQuery for GoCommand {
    fn probe_batch(&self, candidates: &[VersionCandidate]) -> Result<Vec<ProbeResult>> {
        let mut args: Vec<String> = ["list", "-m", "-e", "-json"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.extend(candidates.iter().map(VersionCandidate::query));

        let output = self.run_go(&args)?;
        Self::ensure_success(&output, "go list -m -e -json")?;

        decode_list_output(&output.stdout)
    }

    fn query_version(&self, module_path: &str, version: &str) -> Result<String> {
        let args = vec![
            "list".to_string(),
            "-m".to_string(),
            "-f".to_string(),
            "{{.Version}}".to_string(),
            format!("{module_path}@{version}"),
        ];

        let output = self.run_go(&args)?;
        Self::ensure_success(&output, "go list -m -f {{.Version}}")?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// One record of `go list -m -json` output.
#[derive(Debug, Deserialize)]
struct ListRecord {
    #[serde(rename = "Version", default)]
    version: String,
    #[serde(rename = "Error", default)]
    error: Option<ListError>,
}

#[derive(Debug, Deserialize)]
struct ListError {
    #[serde(rename = "Err", default)]
    err: String,
}

/// Decodes the concatenated JSON objects printed by `go list -m -e -json`,
/// keeping their order.
pub(crate) fn decode_list_output(stdout: &[u8]) -> Result<Vec<ProbeResult>> {
    serde_json::Deserializer::from_slice(stdout)
        .into_iter::<ListRecord>()
        .map(|record| {
            let record = record?;
            match record.error.map(|e| e.err).filter(|err| !err.is_empty()) {
                Some(err) => Ok(ProbeResult::failed(err)),
                None => Ok(ProbeResult::found(record.version)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_stream_in_order() {
        let stdout = br#"{
	"Path": "example.com/mod/v2",
	"Version": "v2.3.1",
	"Time": "2021-01-01T00:00:00Z"
}
{
	"Path": "example.com/mod/v3",
	"Version": "v3",
	"Error": {
		"Err": "example.com/mod/v3@v3: no matching versions for query \"v3\""
	}
}
{
	"Path": "example.com/mod/v4",
	"Error": {
		"Err": ""
	}
}
"#;
        let results = decode_list_output(stdout).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], ProbeResult::found("v2.3.1"));
        assert!(
            results[1]
                .error
                .as_deref()
                .unwrap()
                .contains("no matching versions for query")
        );
        assert_eq!(results[2].error, None);
    }

    #[test]
    fn rejects_garbage_output() {
        let err = decode_list_output(b"{\"Version\": ").unwrap_err();
        assert!(matches!(err, GomajorError::Json(_)));
    }

    #[test]
    fn missing_binary_is_transport_failure() {
        let dir = tempfile::tempdir().unwrap();
        let go = GoCommand::new(dir.path().join("no-such-go"), dir.path());
        let err = go.query_version("example.com/mod", "v2").unwrap_err();
        assert!(matches!(err, GomajorError::TransportFailure(_)));
    }
}
