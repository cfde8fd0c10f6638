use crate::error::{GomajorError, Result};
use crate::repository::{ModuleQuery, VersionCandidate};
use tracing::{debug, info};

/// Number of major lines probed per oracle round trip.
pub const BATCH_SIZE: u64 = 25;

/// Consecutive batches of nothing but non-terminal errors tolerated before
/// giving up on the oracle.
///
/// Giving up is a `TransportFailure` even when an earlier batch already found
/// a version: the unanswered lines above it may exist, so that version is not
/// known to be the highest.
pub const MAX_STALLED_BATCHES: u32 = 4;

/// Error text `go list` emits when a queried major line has no release.
///
/// Matching on message text is fragile, but the oracle offers no structured
/// code that separates "not published" from other failures such as
/// incompatible pre-module versions.
pub const NO_MATCHING_VERSIONS: &str = "no matching versions for query";

/// VersionResolver finds the major line and concrete version to upgrade to
pub struct VersionResolver<'a> {
    query: &'a dyn ModuleQuery,
    batch_size: u64,
}

impl<'a> VersionResolver<'a> {
    pub fn new(query: &'a dyn ModuleQuery) -> Self {
        Self {
            query,
            batch_size: BATCH_SIZE,
        }
    }

    #[cfg(test)]
    fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Probe successive major lines of `prefix` and return the version of the
    /// highest one that exists.
    ///
    /// Probing starts one line above `current_major` (line 2 when the path has
    /// no major suffix) and stops at the first line the oracle reports as
    /// unpublished. Other probe errors are logged and skipped.
    pub fn resolve_highest_major(&self, prefix: &str, current_major: Option<u64>) -> Result<String> {
        let mut next_major = match current_major {
            Some(major) => major
                .checked_add(1)
                .ok_or_else(|| major_out_of_range(prefix))?,
            None => 2,
        };
        let mut best: Option<String> = None;
        let mut stalled_batches = 0;

        loop {
            let batch_end = next_major
                .checked_add(self.batch_size)
                .ok_or_else(|| major_out_of_range(prefix))?;
            let candidates: Vec<VersionCandidate> = (next_major..batch_end)
                .map(|major| VersionCandidate::major_line(prefix, major))
                .collect();

            debug!("Probing {}/v{}..v{}", prefix, next_major, batch_end - 1);
            let results = self.query.probe_batch(&candidates)?;
            if results.len() != candidates.len() {
                return Err(GomajorError::TransportFailure(format!(
                    "expected {} probe results, received {}",
                    candidates.len(),
                    results.len()
                )));
            }

            let mut progressed = false;
            for (candidate, result) in candidates.iter().zip(results) {
                match result.error {
                    None => {
                        debug!("Found {}@{}", candidate.module_path, result.version);
                        best = Some(result.version);
                        progressed = true;
                    }
                    Some(err) if err.contains(NO_MATCHING_VERSIONS) => {
                        return match best {
                            Some(version) => {
                                info!("Found target version: {}/{}", prefix, version);
                                Ok(version)
                            }
                            None => Err(GomajorError::ResolutionExhausted(prefix.to_string())),
                        };
                    }
                    Some(err) => debug!("{}", err),
                }
            }

            if progressed {
                stalled_batches = 0;
            } else {
                stalled_batches += 1;
                if stalled_batches >= MAX_STALLED_BATCHES {
                    return Err(GomajorError::TransportFailure(format!(
                        "no usable answer for {} consecutive probe batches of {}",
                        stalled_batches, prefix
                    )));
                }
            }

            next_major = batch_end;
        }
    }

    /// Resolve `path@target` to the concrete version the oracle selects, e.g.
    /// the highest minor/patch release within a major line.
    pub fn resolve_full_version(&self, path: &str, target: &str) -> Result<String> {
        let version = self.query.query_version(path, target)?;
        let version = version.trim();
        if version.is_empty() {
            return Err(GomajorError::TransportFailure(format!(
                "no version reported for {path}@{target}"
            )));
        }

        debug!("Resolved {}@{} to {}", path, target, version);
        Ok(version.to_string())
    }
}

fn major_out_of_range(prefix: &str) -> GomajorError {
    GomajorError::InvalidInput(format!("Major version of {prefix} is too large to probe"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::repository::ProbeResult;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted oracle: majors up to `published` exist, the rest are
    /// unpublished, with optional per-major error overrides.
    pub(crate) struct FakeOracle {
        pub published: u64,
        pub errors: HashMap<u64, String>,
        pub full_versions: HashMap<String, String>,
        pub batches: RefCell<Vec<Vec<VersionCandidate>>>,
    }

    impl FakeOracle {
        pub(crate) fn new(published: u64) -> Self {
            Self {
                published,
                errors: HashMap::new(),
                full_versions: HashMap::new(),
                batches: RefCell::new(Vec::new()),
            }
        }
    }

    impl ModuleQuery for FakeOracle {
        fn probe_batch(&self, candidates: &[VersionCandidate]) -> Result<Vec<ProbeResult>> {
            self.batches.borrow_mut().push(candidates.to_vec());
            Ok(candidates
                .iter()
                .map(|candidate| {
                    let major: u64 = candidate.query_version[1..].parse().unwrap();
                    if let Some(err) = self.errors.get(&major) {
                        ProbeResult::failed(err.clone())
                    } else if major <= self.published {
                        ProbeResult::found(format!("v{major}.1.0"))
                    } else {
                        ProbeResult::failed(format!(
                            "{}: no matching versions for query \"{}\"",
                            candidate.query(),
                            candidate.query_version
                        ))
                    }
                })
                .collect())
        }

        fn query_version(&self, module_path: &str, version: &str) -> Result<String> {
            self.full_versions
                .get(&format!("{module_path}@{version}"))
                .cloned()
                .ok_or_else(|| {
                    GomajorError::TransportFailure(format!(
                        "{module_path}@{version}: unknown revision"
                    ))
                })
        }
    }

    #[test]
    fn finds_highest_major_from_unsuffixed_path() {
        let oracle = FakeOracle::new(2);
        let resolver = VersionResolver::new(&oracle);
        let version = resolver.resolve_highest_major("example.com/mod", None).unwrap();
        assert_eq!(version, "v2.1.0");

        let batches = oracle.batches.borrow();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0], VersionCandidate::major_line("example.com/mod", 2));
        assert_eq!(batches[0][0].query(), "example.com/mod/v2@v2");
    }

    #[test]
    fn starts_after_current_major() {
        let oracle = FakeOracle::new(5);
        let resolver = VersionResolver::new(&oracle);
        let version = resolver.resolve_highest_major("example.com/mod", Some(3)).unwrap();
        assert_eq!(version, "v5.1.0");
        assert_eq!(oracle.batches.borrow()[0][0].query_version, "v4");
    }

    #[test]
    fn batches_are_contiguous_and_increasing() {
        let oracle = FakeOracle::new(11);
        let resolver = VersionResolver::new(&oracle).with_batch_size(4);
        let version = resolver.resolve_highest_major("example.com/mod", None).unwrap();
        assert_eq!(version, "v11.1.0");

        let majors: Vec<u64> = oracle
            .batches
            .borrow()
            .iter()
            .inspect(|batch| assert_eq!(batch.len(), 4))
            .flatten()
            .map(|c| c.query_version[1..].parse().unwrap())
            .collect();
        assert_eq!(majors, (2..14).collect::<Vec<_>>());
    }

    #[test]
    fn default_batch_size_is_twenty_five() {
        let oracle = FakeOracle::new(30);
        let resolver = VersionResolver::new(&oracle);
        assert_eq!(
            resolver.resolve_highest_major("example.com/mod", None).unwrap(),
            "v30.1.0"
        );
        let batches = oracle.batches.borrow();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 25));
        assert_eq!(batches[1][0].query_version, "v27");
    }

    #[test]
    fn no_published_major_is_exhausted() {
        let oracle = FakeOracle::new(1);
        let resolver = VersionResolver::new(&oracle);
        let err = resolver.resolve_highest_major("example.com/mod", None).unwrap_err();
        assert!(matches!(err, GomajorError::ResolutionExhausted(_)));
    }

    #[test]
    fn other_errors_are_skipped() {
        let mut oracle = FakeOracle::new(4);
        oracle.errors.insert(
            3,
            "example.com/mod/v3@v3: invalid version: module contains a go.mod file, so major version must be compatible".to_string(),
        );
        let resolver = VersionResolver::new(&oracle);
        assert_eq!(
            resolver.resolve_highest_major("example.com/mod", None).unwrap(),
            "v4.1.0"
        );
    }

    #[test]
    fn error_before_first_gap_keeps_earlier_success() {
        let mut oracle = FakeOracle::new(3);
        oracle.errors.insert(3, "dial tcp: i/o timeout".to_string());
        let resolver = VersionResolver::new(&oracle);
        assert_eq!(
            resolver.resolve_highest_major("example.com/mod", None).unwrap(),
            "v2.1.0"
        );
    }

    #[test]
    fn persistent_failures_give_up() {
        let mut oracle = FakeOracle::new(u64::MAX);
        for major in 2..200 {
            oracle.errors.insert(major, "proxy unavailable".to_string());
        }
        let resolver = VersionResolver::new(&oracle).with_batch_size(5);
        let err = resolver.resolve_highest_major("example.com/mod", None).unwrap_err();
        assert!(matches!(err, GomajorError::TransportFailure(_)));
        assert_eq!(oracle.batches.borrow().len(), MAX_STALLED_BATCHES as usize);
    }

    #[test]
    fn stalled_batches_after_a_success_still_fail() {
        let mut oracle = FakeOracle::new(u64::MAX);
        for major in 3..200 {
            oracle.errors.insert(major, "proxy unavailable".to_string());
        }
        let resolver = VersionResolver::new(&oracle).with_batch_size(5);
        let err = resolver.resolve_highest_major("example.com/mod", None).unwrap_err();
        assert!(matches!(err, GomajorError::TransportFailure(_)));
        assert_eq!(oracle.batches.borrow().len(), 1 + MAX_STALLED_BATCHES as usize);
    }

    #[test]
    fn huge_current_major_is_rejected() {
        let oracle = FakeOracle::new(2);
        let resolver = VersionResolver::new(&oracle);
        for major in [u64::MAX, u64::MAX - 3] {
            let err = resolver
                .resolve_highest_major("example.com/mod", Some(major))
                .unwrap_err();
            assert!(matches!(err, GomajorError::InvalidInput(_)), "{major}");
        }
        assert!(oracle.batches.borrow().is_empty());
    }

    #[test]
    fn full_version_is_trimmed() {
        let mut oracle = FakeOracle::new(2);
        oracle
            .full_versions
            .insert("example.com/mod/v2@v2".to_string(), " v2.4.1\n".to_string());
        let resolver = VersionResolver::new(&oracle);
        assert_eq!(
            resolver.resolve_full_version("example.com/mod/v2", "v2").unwrap(),
            "v2.4.1"
        );
    }

    #[test]
    fn full_version_failure_surfaces_diagnostic() {
        let oracle = FakeOracle::new(2);
        let resolver = VersionResolver::new(&oracle);
        let err = resolver
            .resolve_full_version("example.com/mod/v9", "v9")
            .unwrap_err();
        assert!(err.to_string().contains("unknown revision"));
    }
}
