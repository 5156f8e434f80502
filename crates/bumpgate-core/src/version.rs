//! Ecosystem-agnostic version model.
//!
//! A [`Version`] is any string split on `.` into [`Component`]s. Parsing never
//! fails, so non-semantic versions such as `Finchley.SR3` are first-class.
//!
//! # Ordering
//!
//! Comparison works on a finer segmentation of the components:
//!
//! - each component is split into digit runs and letter runs
//!   (`SR3` becomes `SR`, `3`)
//! - a `-` inside a component starts a pre-release, modelled as a `pre`
//!   letter segment (`4-rc0` becomes `4`, `pre`, `rc`, `0`)
//! - a missing trailing segment compares as numeric zero, so `1.3 == 1.3.0`
//! - a letter segment sorts before any numeric segment, so `1.2.a < 1.2.0`
//!   and `1.0.0-rc1 < 1.0.0`
//! - letter segments compare ASCII-case-insensitively
//!
//! The letter [`ALPHA_MARKER`] is therefore the smallest thing that can appear
//! at a position, which is what lets a lower bound like `>= 1.2.a` include every
//! pre-release and patch build of `1.2`.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Synthetic component that sorts before any numeric or absent value.
pub const ALPHA_MARKER: &str = "a";

/// Synthetic upper bound used when no successor can be computed for a
/// non-numeric component.
pub const UPPER_SENTINEL: u64 = 999_999;

/// One `.`-separated piece of a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    Numeric(u64),
    Opaque(String),
}

impl Component {
    fn parse(raw: &str) -> Self {
        if !raw.is_empty()
            && raw.bytes().all(|b| b.is_ascii_digit())
            && let Ok(n) = raw.parse()
        {
            return Self::Numeric(n);
        }
        Self::Opaque(raw.to_string())
    }

    /// Returns the numeric value, or `None` for an opaque token.
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Opaque(_) => None,
        }
    }

    /// Returns the next numeric value, or `None` when the component is opaque
    /// or already at `u64::MAX`.
    pub fn successor(&self) -> Option<u64> {
        self.as_numeric().and_then(|n| n.checked_add(1))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Opaque(s) => f.write_str(s),
        }
    }
}

/// Comparable unit produced by segmenting the components.
#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Number(u64),
    Text(&'a str),
}

const PRE_RELEASE: &str = "pre";

/// A parsed, immutable version.
///
/// # Examples
///
/// ```
/// use bumpgate_core::version::{Component, Version};
///
/// let version = Version::parse("1.2.4-rc0");
/// assert_eq!(version.len(), 3);
/// assert_eq!(version.component_at(0), Some(&Component::Numeric(1)));
/// assert!(version < Version::parse("1.2.4"));
/// assert_eq!(Version::parse("1.3"), Version::parse("1.3.0"));
/// ```
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    components: Vec<Component>,
}

impl Version {
    /// Parses any string into a version. Never fails.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        Self {
            raw: raw.to_string(),
            components: raw.split('.').map(Component::parse).collect(),
        }
    }

    /// Original (trimmed) text of the version.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Returns the `index`-th component, or `None` when absent.
    pub fn component_at(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    /// Number of `.`-separated components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True for a version parsed from an empty string.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::with_capacity(self.components.len());
        for component in &self.components {
            match component {
                Component::Numeric(n) => segments.push(Segment::Number(*n)),
                Component::Opaque(token) => segment_token(token, &mut segments),
            }
        }
        segments
    }
}

fn segment_token<'a>(token: &'a str, out: &mut Vec<Segment<'a>>) {
    let bytes = token.as_bytes();
    let mut start = 0;

    while start < bytes.len() {
        let b = bytes[start];
        if b == b'-' {
            out.push(Segment::Text(PRE_RELEASE));
            start += 1;
            continue;
        }
        if !b.is_ascii_alphanumeric() {
            start += 1;
            continue;
        }

        let digits = b.is_ascii_digit();
        let end = bytes[start..]
            .iter()
            .position(|c| {
                if digits {
                    !c.is_ascii_digit()
                } else {
                    !c.is_ascii_alphabetic()
                }
            })
            .map_or(bytes.len(), |offset| start + offset);

        let run = &token[start..end];
        match run.parse::<u64>() {
            Ok(n) if digits => out.push(Segment::Number(n)),
            _ => out.push(Segment::Text(run)),
        }
        start = end;
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let folded_a = a.bytes().map(|c| c.to_ascii_lowercase());
    let folded_b = b.bytes().map(|c| c.to_ascii_lowercase());
    folded_a.cmp(folded_b).then_with(|| a.cmp(b))
}

fn compare_segments(a: &[Segment<'_>], b: &[Segment<'_>]) -> Ordering {
    let zero = Segment::Number(0);
    for i in 0..a.len().max(b.len()) {
        let left = a.get(i).copied().unwrap_or(zero);
        let right = b.get(i).copied().unwrap_or(zero);

        let ordering = match (left, right) {
            (Segment::Number(x), Segment::Number(y)) => x.cmp(&y),
            (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
            (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
            (Segment::Text(x), Segment::Text(y)) => compare_text(x, y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_segments(&self.segments(), &other.segments())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
