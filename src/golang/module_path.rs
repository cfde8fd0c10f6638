use crate::error::{GomajorError, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static MAJOR_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>.+)/v(?P<major>[2-9]|[1-9][0-9]+)$").expect("valid major regex")
});

static PATH_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-._~]+$").expect("valid element regex"));

/// A module path split into its unversioned prefix and optional major suffix.
///
/// Major lines 0 and 1 carry no suffix, so `major` is either `None` or `>= 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentity {
    pub prefix: String,
    pub major: Option<u64>,
}

impl ModuleIdentity {
    /// Validates `path` and splits off a trailing `/vN` element.
    pub fn parse(path: &str) -> Result<Self> {
        check_path(path)?;

        if path.starts_with("gopkg.in/") {
            return Err(GomajorError::InvalidInput(format!(
                "gopkg.in module paths are not supported: {path}"
            )));
        }

        match MAJOR_SUFFIX.captures(path) {
            Some(caps) => {
                let major = caps["major"].parse::<u64>().map_err(|e| {
                    GomajorError::InvalidInput(format!("Invalid major version in {path}: {e}"))
                })?;
                Ok(Self {
                    prefix: caps["prefix"].to_string(),
                    major: Some(major),
                })
            }
            None => Ok(Self {
                prefix: path.to_string(),
                major: None,
            }),
        }
    }

    /// The effective major line; paths without a suffix are line 1.
    pub fn current_major(&self) -> u64 {
        self.major.unwrap_or(1)
    }

    /// Module path for the given major line under the same prefix.
    pub fn path_for_major(&self, major: u64) -> String {
        if major <= 1 {
            self.prefix.clone()
        } else {
            format!("{}/v{}", self.prefix, major)
        }
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.major {
            Some(major) => write!(f, "{}/v{}", self.prefix, major),
            None => f.write_str(&self.prefix),
        }
    }
}

/// Returns true when `path` is `base` itself or a package below it.
pub fn is_within(path: &str, base: &str) -> bool {
    match path.strip_prefix(base) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

fn check_path(path: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(GomajorError::InvalidInput(format!(
            "Invalid module path {path}: {reason}"
        )))
    };

    if path.is_empty() {
        return invalid("empty path");
    }
    if path.starts_with('/') || path.ends_with('/') {
        return invalid("leading or trailing slash");
    }

    for element in path.split('/') {
        if element.is_empty() {
            return invalid("empty path element");
        }
        if element.starts_with('.') || element.ends_with('.') {
            return invalid("path element begins or ends with a dot");
        }
        if !PATH_ELEMENT.is_match(element) {
            return invalid("path element contains a disallowed character");
        }
    }

    let first = path.split('/').next().unwrap_or_default();
    if !first.contains('.') {
        return invalid("missing dot in first path element");
    }
    if first.starts_with('-') {
        return invalid("leading dash in first path element");
    }

    Ok(())
}
