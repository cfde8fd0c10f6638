use crate::error::{GomajorError, Result};
use std::cmp::Ordering;

/// A Go module version (`v` prefixed semantic version).
///
/// Go also accepts the `vMAJOR` and `vMAJOR.MINOR` shorthands in queries; those
/// are kept as written in `original` and padded with zeros in `parsed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoVersion {
    pub original: String,
    pub parsed: semver::Version,
}

impl GoVersion {
    pub fn parse(version: &str) -> Result<Self> {
        let invalid =
            || GomajorError::InvalidInput(format!("Invalid target version: {version}"));

        let body = version.strip_prefix('v').ok_or_else(invalid)?;
        let core_len = body.find(['-', '+']).unwrap_or(body.len());
        let components = body[..core_len].split('.').count();

        let parsed = match components {
            1 | 2 if core_len == body.len() => {
                let mut numbers = Vec::with_capacity(3);
                for part in body.split('.') {
                    numbers.push(parse_numeric(part).ok_or_else(invalid)?);
                }
                numbers.resize(3, 0);
                semver::Version::new(numbers[0], numbers[1], numbers[2])
            }
            3 => semver::Version::parse(body).map_err(|_| invalid())?,
            _ => return Err(invalid()),
        };

        Ok(Self {
            original: version.to_string(),
            parsed,
        })
    }

    pub fn major(&self) -> u64 {
        self.parsed.major
    }
}

impl PartialOrd for GoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

/// Orders two version strings, falling back to plain string order when either
/// one is not a valid Go version.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (GoVersion::parse(a), GoVersion::parse(b)) {
        (Ok(va), Ok(vb)) => va.cmp(&vb),
        _ => a.cmp(b),
    }
}

fn parse_numeric(part: &str) -> Option<u64> {
    if part.is_empty() || (part.len() > 1 && part.starts_with('0')) {
        return None;
    }
    if !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
