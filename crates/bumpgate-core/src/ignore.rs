//! Ignore rules.
//!
//! An [`IgnoreCondition`] turns user policy into the [`VersionRange`]s that
//! must be excluded from candidate updates of one dependency. A candidate is
//! ignored when any returned range accepts it.
//!
//! Static `versions` always win over `update-types`. Update types are
//! evaluated independently against the current version; a type that cannot be
//! computed for that version contributes nothing.

use crate::error::BumpgateError;
use crate::requirement::VersionRange;
use crate::version::{ALPHA_MARKER, Component, UPPER_SENTINEL, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic distance between a current and a candidate version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateClass {
    #[serde(rename = "version-update:semver-major")]
    Major,
    #[serde(rename = "version-update:semver-minor")]
    Minor,
    #[serde(rename = "version-update:semver-patch")]
    Patch,
}

impl UpdateClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Major => "version-update:semver-major",
            Self::Minor => "version-update:semver-minor",
            Self::Patch => "version-update:semver-patch",
        }
    }

    /// Range of versions that are an update of this class away from `current`.
    ///
    /// Returns `None` when `current` has too few components: major and minor
    /// need two, patch needs three.
    ///
    /// # Examples
    ///
    /// ```
    /// use bumpgate_core::ignore::UpdateClass;
    /// use bumpgate_core::version::Version;
    ///
    /// let current = Version::parse("1.2.3");
    /// let range = UpdateClass::Patch.ignore_range(&current).unwrap();
    /// assert_eq!(range.to_string(), ">= 1.2.a, < 1.3");
    ///
    /// assert!(UpdateClass::Patch.ignore_range(&Version::parse("1.2")).is_none());
    /// ```
    pub fn ignore_range(self, current: &Version) -> Option<VersionRange> {
        match self {
            Self::Major => major_range(current),
            Self::Minor => minor_range(current),
            Self::Patch => patch_range(current),
        }
    }
}

impl fmt::Display for UpdateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateClass {
    type Err = BumpgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "version-update:semver-major" => Ok(Self::Major),
            "version-update:semver-minor" => Ok(Self::Minor),
            "version-update:semver-patch" => Ok(Self::Patch),
            other => Err(BumpgateError::InvalidUpdateType(other.to_string())),
        }
    }
}

fn range(lower: &str, upper: &str) -> VersionRange {
    VersionRange::between(Version::parse(lower), Version::parse(upper))
}

/// Everything left on the current major line, used when the next minor
/// cannot be computed.
fn major_line(major: &Component) -> VersionRange {
    range(
        &format!("{major}.{ALPHA_MARKER}"),
        &format!("{major}.{UPPER_SENTINEL}"),
    )
}

fn major_range(current: &Version) -> Option<VersionRange> {
    if current.len() < 2 {
        return None;
    }
    let next_major = current.component_at(0)?.successor()?;
    let ceiling = next_major.checked_add(1)?;
    Some(range(&format!("{next_major}.{ALPHA_MARKER}"), &ceiling.to_string()))
}

fn minor_range(current: &Version) -> Option<VersionRange> {
    if current.len() < 2 {
        return None;
    }
    let major = current.component_at(0)?;
    let minor = current.component_at(1)?;

    let Some(next_minor) = minor.successor() else {
        return Some(major_line(major));
    };
    let lower = format!("{major}.{next_minor}.{ALPHA_MARKER}");
    let upper = match major.successor() {
        Some(next_major) => next_major.to_string(),
        None => format!("{major}.{UPPER_SENTINEL}"),
    };
    Some(range(&lower, &upper))
}

fn patch_range(current: &Version) -> Option<VersionRange> {
    if current.len() < 3 {
        return None;
    }
    let major = current.component_at(0)?;
    let minor = current.component_at(1)?;

    Some(match minor.successor() {
        Some(next_minor) => range(
            &format!("{major}.{minor}.{ALPHA_MARKER}"),
            &format!("{major}.{next_minor}"),
        ),
        None => major_line(major),
    })
}

/// A user-configured rule suppressing candidate updates of a dependency.
///
/// Deserializes from the update configuration shape:
///
/// ```
/// use bumpgate_core::ignore::{IgnoreCondition, UpdateClass};
///
/// let condition: IgnoreCondition = serde_json::from_str(r#"{
///     "dependency-name": "express",
///     "update-types": ["version-update:semver-patch"]
/// }"#).unwrap();
///
/// assert_eq!(condition.update_types, vec![UpdateClass::Patch]);
/// let ranges: Vec<String> = condition
///     .ignored_versions(Some("4.18.2"))
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// assert_eq!(ranges, vec![">= 4.18.a, < 4.19"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IgnoreCondition {
    pub dependency_name: String,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub update_types: Vec<UpdateClass>,
}

impl IgnoreCondition {
    /// A bare condition, which ignores every version of the dependency.
    pub fn new(dependency_name: impl Into<String>) -> Self {
        Self {
            dependency_name: dependency_name.into(),
            ..Self::default()
        }
    }

    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions = versions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_update_types(
        mut self,
        update_types: impl IntoIterator<Item = UpdateClass>,
    ) -> Self {
        self.update_types = update_types.into_iter().collect();
        self
    }

    /// Ranges to exclude for a dependency currently at `current_version`.
    ///
    /// - no versions and no update types: `[">= 0"]`
    /// - static versions: those ranges in canonical form, update types unused
    /// - otherwise one range per computable update type, in configured order
    pub fn ignored_versions(&self, current_version: Option<&str>) -> Vec<VersionRange> {
        if self.versions.is_empty() && self.update_types.is_empty() {
            return vec![VersionRange::any()];
        }

        if !self.versions.is_empty() {
            if !self.update_types.is_empty() {
                tracing::debug!(
                    dependency = %self.dependency_name,
                    "static versions configured, update types not evaluated"
                );
            }
            return self
                .versions
                .iter()
                .map(|raw| VersionRange::parse(raw))
                .collect();
        }

        let Some(current) = current_version.map(Version::parse) else {
            tracing::debug!(
                dependency = %self.dependency_name,
                "no current version, update types contribute nothing"
            );
            return Vec::new();
        };

        let mut evaluated: Vec<UpdateClass> = Vec::with_capacity(self.update_types.len());
        let mut ranges = Vec::with_capacity(self.update_types.len());
        for class in &self.update_types {
            if evaluated.contains(class) {
                continue;
            }
            evaluated.push(*class);

            match class.ignore_range(&current) {
                Some(range) => ranges.push(range),
                None => tracing::debug!(
                    dependency = %self.dependency_name,
                    version = %current,
                    update_type = %class,
                    "update type not computable for version"
                ),
            }
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATCH_UPGRADES: [&str; 4] = ["1.2.3", "1.2.4", "1.2.5", "1.2.4-rc0"];
    const MINOR_UPGRADES: [&str; 4] = ["1.3", "1.3.0", "1.4", "1.4.0"];
    const MAJOR_UPGRADES: [&str; 3] = ["2", "2.0", "2.0.0"];

    fn condition(update_types: &[UpdateClass]) -> IgnoreCondition {
        IgnoreCondition::new("test").with_update_types(update_types.iter().copied())
    }

    fn rendered(ranges: &[VersionRange]) -> Vec<String> {
        ranges.iter().map(ToString::to_string).collect()
    }

    fn is_ignored(ranges: &[VersionRange], version: &str) -> bool {
        let version = Version::parse(version);
        ranges.iter().any(|range| range.satisfied_by(&version))
    }

    fn expect_ignored(ranges: &[VersionRange], versions: &[&str]) {
        for version in versions {
            assert!(
                is_ignored(ranges, version),
                "Expected {version} to be ignored, but was allowed"
            );
        }
    }

    fn expect_allowed(ranges: &[VersionRange], versions: &[&str]) {
        for version in versions {
            assert!(
                !is_ignored(ranges, version),
                "Expected {version} to be allowed, but was ignored"
            );
        }
    }

    #[test]
    fn test_bare_condition_ignores_everything() {
        let ranges = IgnoreCondition::new("test").ignored_versions(Some("1.2.3"));
        assert_eq!(rendered(&ranges), vec![">= 0"]);

        let ranges = IgnoreCondition::new("test").ignored_versions(None);
        assert_eq!(rendered(&ranges), vec![">= 0"]);
    }

    #[test]
    fn test_static_versions_returned_canonically() {
        let ignore = IgnoreCondition::new("test").with_versions([">= 2.0.0"]);
        let ranges = ignore.ignored_versions(Some("1.2.3"));
        assert_eq!(rendered(&ranges), vec![">= 2.0.0"]);
        expect_allowed(&ranges, &["1.0.0", "1.1.0", "1.1.1"]);
        expect_ignored(&ranges, &["2.0", "2.0.0"]);

        let ignore = IgnoreCondition::new("test").with_versions([">=1.0,<1.5", "2.x"]);
        assert_eq!(
            rendered(&ignore.ignored_versions(None)),
            vec![">= 1.0, < 1.5", "= 2.x"]
        );
    }

    #[test]
    fn test_static_versions_take_precedence() {
        let ignore = IgnoreCondition::new("test")
            .with_versions([">= 3"])
            .with_update_types([UpdateClass::Patch, UpdateClass::Major]);
        assert_eq!(rendered(&ignore.ignored_versions(Some("1.2.3"))), vec![">= 3"]);
    }

    #[test]
    fn test_patch() {
        let ranges = condition(&[UpdateClass::Patch]).ignored_versions(Some("1.2.3"));
        assert_eq!(rendered(&ranges), vec![">= 1.2.a, < 1.3"]);
        expect_ignored(&ranges, &PATCH_UPGRADES);
        expect_allowed(&ranges, &MINOR_UPGRADES);
        expect_allowed(&ranges, &MAJOR_UPGRADES);
    }

    #[test]
    fn test_minor() {
        let ranges = condition(&[UpdateClass::Minor]).ignored_versions(Some("1.2.3"));
        assert_eq!(rendered(&ranges), vec![">= 1.3.a, < 2"]);
        expect_ignored(&ranges, &MINOR_UPGRADES);
        expect_allowed(&ranges, &PATCH_UPGRADES);
        expect_allowed(&ranges, &MAJOR_UPGRADES);
    }

    #[test]
    fn test_major() {
        let ranges = condition(&[UpdateClass::Major]).ignored_versions(Some("1.2.3"));
        assert_eq!(rendered(&ranges), vec![">= 2.a, < 3"]);
        expect_ignored(&ranges, &MAJOR_UPGRADES);
        expect_allowed(&ranges, &PATCH_UPGRADES);
        expect_allowed(&ranges, &MINOR_UPGRADES);
    }

    #[test]
    fn test_major_and_patch() {
        let ranges =
            condition(&[UpdateClass::Major, UpdateClass::Patch]).ignored_versions(Some("1.2.3"));
        assert_eq!(rendered(&ranges), vec![">= 2.a, < 3", ">= 1.2.a, < 1.3"]);
        expect_ignored(&ranges, &PATCH_UPGRADES);
        expect_ignored(&ranges, &MAJOR_UPGRADES);
        expect_allowed(&ranges, &MINOR_UPGRADES);
    }

    #[test]
    fn test_repeated_update_type_evaluated_once() {
        let ranges =
            condition(&[UpdateClass::Minor, UpdateClass::Minor]).ignored_versions(Some("1.2.3"));
        assert_eq!(rendered(&ranges), vec![">= 1.3.a, < 2"]);
    }

    #[test]
    fn test_major_minor_version() {
        let major = condition(&[UpdateClass::Major]).ignored_versions(Some("1.2"));
        assert_eq!(rendered(&major), vec![">= 2.a, < 3"]);
        expect_ignored(&major, &MAJOR_UPGRADES);
        expect_allowed(&major, &PATCH_UPGRADES);
        expect_allowed(&major, &MINOR_UPGRADES);

        let minor = condition(&[UpdateClass::Minor]).ignored_versions(Some("1.2"));
        assert_eq!(rendered(&minor), vec![">= 1.3.a, < 2"]);
        expect_ignored(&minor, &MINOR_UPGRADES);
        expect_allowed(&minor, &PATCH_UPGRADES);
        expect_allowed(&minor, &MAJOR_UPGRADES);

        let patch = condition(&[UpdateClass::Patch]).ignored_versions(Some("1.2"));
        assert!(patch.is_empty());
    }

    #[test]
    fn test_major_only_version() {
        for class in [UpdateClass::Major, UpdateClass::Minor, UpdateClass::Patch] {
            assert!(condition(&[class]).ignored_versions(Some("1")).is_empty());
        }
    }

    #[test]
    fn test_non_semver_version() {
        let patch = condition(&[UpdateClass::Patch]).ignored_versions(Some("Finchley.SR3"));
        assert!(patch.is_empty());

        let minor = condition(&[UpdateClass::Minor]).ignored_versions(Some("Finchley.SR3"));
        assert_eq!(rendered(&minor), vec![">= Finchley.a, < Finchley.999999"]);
        expect_ignored(&minor, &["Finchley.SR3", "Finchley.SR4", "Finchley.RELEASE"]);
        expect_allowed(&minor, &["Greenwich.SR1", "Edgware.SR2"]);

        let major = condition(&[UpdateClass::Major]).ignored_versions(Some("Finchley.SR3"));
        assert!(major.is_empty());
    }

    #[test]
    fn test_opaque_major_with_numeric_minor() {
        let minor = condition(&[UpdateClass::Minor]).ignored_versions(Some("Hoxton.2.1"));
        assert_eq!(rendered(&minor), vec![">= Hoxton.3.a, < Hoxton.999999"]);

        let patch = condition(&[UpdateClass::Patch]).ignored_versions(Some("Hoxton.2.1"));
        assert_eq!(rendered(&patch), vec![">= Hoxton.2.a, < Hoxton.3"]);
    }

    #[test]
    fn test_patch_with_opaque_minor_falls_back_to_major_line() {
        let patch = condition(&[UpdateClass::Patch]).ignored_versions(Some("2.SR3.1"));
        assert_eq!(rendered(&patch), vec![">= 2.a, < 2.999999"]);
    }

    #[test]
    fn test_missing_current_version() {
        assert!(condition(&[UpdateClass::Major]).ignored_versions(None).is_empty());
    }

    #[test]
    fn test_update_classes_do_not_overlap() {
        let current = Version::parse("4.17.21");
        let patch = UpdateClass::Patch.ignore_range(&current).unwrap();
        let minor = UpdateClass::Minor.ignore_range(&current).unwrap();
        let major = UpdateClass::Major.ignore_range(&current).unwrap();

        let next_patch = Version::parse("4.17.22");
        let next_minor = Version::parse("4.18.0");
        let next_major = Version::parse("5.0.0");

        assert!(patch.satisfied_by(&next_patch));
        assert!(!minor.satisfied_by(&next_patch));
        assert!(!major.satisfied_by(&next_patch));

        assert!(minor.satisfied_by(&next_minor));
        assert!(!patch.satisfied_by(&next_minor));
        assert!(!major.satisfied_by(&next_minor));

        assert!(major.satisfied_by(&next_major));
        assert!(!patch.satisfied_by(&next_major));
        assert!(!minor.satisfied_by(&next_major));
    }

    #[test]
    fn test_idempotent() {
        let ignore = condition(&[UpdateClass::Minor, UpdateClass::Patch]);
        assert_eq!(
            ignore.ignored_versions(Some("3.1.4")),
            ignore.ignored_versions(Some("3.1.4"))
        );
    }

    #[test]
    fn test_update_class_from_str() {
        assert_eq!(
            "version-update:semver-minor".parse::<UpdateClass>().unwrap(),
            UpdateClass::Minor
        );
        assert!("semver-minor".parse::<UpdateClass>().is_err());
        assert!("version-update:semver-MINOR".parse::<UpdateClass>().is_err());
        assert_eq!(UpdateClass::Patch.to_string(), "version-update:semver-patch");
    }

    #[test]
    fn test_deserialize_condition() {
        let json = r#"{
            "dependency-name": "lodash",
            "versions": ["< 4"],
            "update-types": ["version-update:semver-major"]
        }"#;
        let condition: IgnoreCondition = serde_json::from_str(json).unwrap();
        assert_eq!(condition.dependency_name, "lodash");
        assert_eq!(condition.versions, vec!["< 4"]);
        assert_eq!(condition.update_types, vec![UpdateClass::Major]);

        let bare: IgnoreCondition =
            serde_json::from_str(r#"{"dependency-name": "lodash"}"#).unwrap();
        assert!(bare.versions.is_empty());
        assert!(bare.update_types.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_unknown_update_type() {
        let json = r#"{"dependency-name": "x", "update-types": ["version-update:semver-huge"]}"#;
        assert!(serde_json::from_str::<IgnoreCondition>(json).is_err());
    }
}
