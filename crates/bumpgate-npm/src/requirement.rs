//! npm range requirements.

use bumpgate_core::VersionRequirement;
use std::fmt;

/// A requirement as written in a lock file (`^1.0.0`, `~2.1`, `>=1 <3`, `1.x`).
///
/// Evaluated with npm semantics via `node-semver`. Specs that are not version
/// ranges (git URLs, `file:` paths, dist-tags) cannot be evaluated and never
/// reject a version.
///
/// # Examples
///
/// ```
/// use bumpgate_core::VersionRequirement;
/// use bumpgate_npm::NpmRequirement;
///
/// let req = NpmRequirement::parse("^1.0.0");
/// assert!(req.is_satisfied_by("1.9.0"));
/// assert!(!req.is_satisfied_by("2.0.0"));
/// assert_eq!(req.to_string(), "^1.0.0");
/// ```
#[derive(Debug, Clone)]
pub struct NpmRequirement {
    raw: String,
    range: Option<node_semver::Range>,
}

impl NpmRequirement {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let spec = if raw.is_empty() { "*" } else { raw };
        let range = node_semver::Range::parse(spec).ok();
        if range.is_none() {
            tracing::debug!("Requirement '{}' is not a version range", raw);
        }

        Self {
            raw: raw.to_string(),
            range,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// False for git, path, and tag specs.
    pub fn is_range(&self) -> bool {
        self.range.is_some()
    }
}

impl fmt::Display for NpmRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl VersionRequirement for NpmRequirement {
    fn is_satisfied_by(&self, version: &str) -> bool {
        let Some(range) = &self.range else {
            return true;
        };

        match node_semver::Version::parse(version) {
            Ok(version) => range.satisfies(&version),
            Err(e) => {
                tracing::warn!(
                    "Version '{}' is not valid npm semver ({}); '{}' rejects it",
                    version,
                    e,
                    self.raw
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret() {
        let req = NpmRequirement::parse("^1.0.0");
        assert!(req.is_range());
        assert!(req.is_satisfied_by("1.0.0"));
        assert!(req.is_satisfied_by("1.0.5"));
        assert!(!req.is_satisfied_by("2.0.0"));
        assert!(!req.is_satisfied_by("0.9.9"));
    }

    #[test]
    fn test_tilde_and_x_ranges() {
        assert!(NpmRequirement::parse("~1.2").is_satisfied_by("1.2.9"));
        assert!(!NpmRequirement::parse("~1.2").is_satisfied_by("1.3.0"));
        assert!(NpmRequirement::parse("1.x").is_satisfied_by("1.7.0"));
        assert!(!NpmRequirement::parse("1.x").is_satisfied_by("2.0.0"));
    }

    #[test]
    fn test_compound_range() {
        let req = NpmRequirement::parse(">=1.2.0 <3");
        assert!(req.is_satisfied_by("2.5.0"));
        assert!(!req.is_satisfied_by("3.0.0"));
        assert_eq!(req.to_string(), ">=1.2.0 <3");
    }

    #[test]
    fn test_empty_means_any() {
        let req = NpmRequirement::parse("");
        assert!(req.is_range());
        assert!(req.is_satisfied_by("42.0.0"));
    }

    #[test]
    fn test_non_range_specs_never_reject() {
        for spec in [
            "git+https://github.com/user/repo.git#abc123",
            "file:../local",
            "github:user/repo",
        ] {
            let req = NpmRequirement::parse(spec);
            assert!(!req.is_range(), "{spec}");
            assert!(req.is_satisfied_by("99.0.0"), "{spec}");
        }
    }

    #[test]
    fn test_invalid_target_version_rejected() {
        let req = NpmRequirement::parse("^1.0.0");
        assert!(!req.is_satisfied_by("Finchley.SR3"));
    }
}
