//! Version requirements.
//!
//! [`VersionRange`] is a conjunction of comparator/version pairs, rendered
//! canonically as `"{op} {version}"` joined by `", "` (for example
//! `">= 1.2.a, < 1.3"`). Parsing never fails: a constraint without an
//! operator means `=`, and an empty requirement means `>= 0`.
//!
//! [`VersionRequirement`] is the seam used by dependency graph edges, so that
//! each lock file dialect can attach its own requirement semantics.

use crate::version::Version;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Requirement attached to a dependency graph edge.
///
/// Implementations must be pure: the same version always gives the same
/// answer, and `Display` yields the requirement text as the requirer declared it.
pub trait VersionRequirement: fmt::Display + fmt::Debug + Send + Sync {
    /// Returns true if `version` is accepted by this requirement.
    fn is_satisfied_by(&self, version: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// `~>`: at least the bound, below the next release of its second-to-last
    /// numeric component.
    Pessimistic,
}

impl Comparator {
    /// Two-character operators come first so `>=` is never read as `>`.
    const OPERATORS: [(&'static str, Self); 7] = [
        (">=", Self::Gte),
        ("<=", Self::Lte),
        ("!=", Self::NotEq),
        ("~>", Self::Pessimistic),
        (">", Self::Gt),
        ("<", Self::Lt),
        ("=", Self::Eq),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Pessimistic => "~>",
        }
    }

    fn split_prefix(raw: &str) -> (Self, &str) {
        Self::OPERATORS
            .iter()
            .find_map(|(op, comparator)| raw.strip_prefix(op).map(|rest| (*comparator, rest)))
            .unwrap_or((Self::Eq, raw))
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single comparator/version pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    comparator: Comparator,
    version: Version,
}

impl Constraint {
    pub fn new(comparator: Comparator, version: Version) -> Self {
        Self {
            comparator,
            version,
        }
    }

    /// Parses `">= 1.2"`, `">=1.2"` or a bare `"1.2"`.
    pub fn parse(raw: &str) -> Self {
        let (comparator, rest) = Comparator::split_prefix(raw.trim());
        let rest = rest.trim();
        let version = if rest.is_empty() { "0" } else { rest };
        Self::new(comparator, Version::parse(version))
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn satisfied_by(&self, version: &Version) -> bool {
        let bound = &self.version;
        match self.comparator {
            Comparator::Eq => version == bound,
            Comparator::NotEq => version != bound,
            Comparator::Gt => version > bound,
            Comparator::Gte => version >= bound,
            Comparator::Lt => version < bound,
            Comparator::Lte => version <= bound,
            Comparator::Pessimistic => {
                version >= bound
                    && pessimistic_ceiling(bound).is_none_or(|ceiling| version < &ceiling)
            }
        }
    }
}

/// Exclusive upper bound for `~> bound`: drop the last numeric component and
/// bump the one before it (`1.2.3` gives `1.3`, `1.2` gives `2`).
fn pessimistic_ceiling(bound: &Version) -> Option<Version> {
    let mut numbers: Vec<u64> = bound
        .components()
        .iter()
        .map_while(|component| component.as_numeric())
        .collect();
    if numbers.len() > 1 {
        numbers.pop();
    }
    let last = numbers.last_mut()?;
    *last = last.checked_add(1)?;

    let rendered: Vec<String> = numbers.iter().map(u64::to_string).collect();
    Some(Version::parse(&rendered.join(".")))
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.comparator, self.version)
    }
}

/// An immutable conjunction of constraints.
///
/// # Examples
///
/// ```
/// use bumpgate_core::requirement::VersionRange;
/// use bumpgate_core::version::Version;
///
/// let range = VersionRange::parse(">=1.2.a,< 1.3");
/// assert_eq!(range.to_string(), ">= 1.2.a, < 1.3");
/// assert!(range.satisfied_by(&Version::parse("1.2.4-rc0")));
/// assert!(!range.satisfied_by(&Version::parse("1.3.0")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    constraints: Vec<Constraint>,
}

impl VersionRange {
    /// Builds a range from constraints; no constraints means `>= 0`.
    pub fn new(constraints: Vec<Constraint>) -> Self {
        if constraints.is_empty() {
            return Self::any();
        }
        Self { constraints }
    }

    /// The range accepting every version: `>= 0`.
    pub fn any() -> Self {
        Self {
            constraints: vec![Constraint::new(Comparator::Gte, Version::parse("0"))],
        }
    }

    /// Half-open range `>= lower, < upper`.
    pub fn between(lower: Version, upper: Version) -> Self {
        Self {
            constraints: vec![
                Constraint::new(Comparator::Gte, lower),
                Constraint::new(Comparator::Lt, upper),
            ],
        }
    }

    /// Parses a comma-separated requirement. Never fails.
    pub fn parse(raw: &str) -> Self {
        let constraints = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Constraint::parse)
            .collect();
        Self::new(constraints)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// True when every constraint accepts `version`.
    pub fn satisfied_by(&self, version: &Version) -> bool {
        self.constraints.iter().all(|c| c.satisfied_by(version))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, constraint) in self.constraints.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{constraint}")?;
        }
        Ok(())
    }
}

impl FromStr for VersionRange {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl VersionRequirement for VersionRange {
    fn is_satisfied_by(&self, version: &str) -> bool {
        self.satisfied_by(&Version::parse(version))
    }
}
