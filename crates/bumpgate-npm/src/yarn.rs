//! yarn.lock graph building.
//!
//! Handles both the classic (v1) format and the berry format. Berry lock
//! files are YAML and start with a `__metadata` block; classic lock files are
//! not YAML and are read line by line.
//!
//! # yarn.lock Format
//!
//! Classic:
//! ```text
//! "objnest@^4.1.0":
//!   version "4.1.4"
//!   resolved "https://registry.yarnpkg.com/objnest/-/objnest-4.1.4.tgz"
//!   dependencies:
//!     abind "^1.0.0"
//! ```
//!
//! Berry:
//! ```text
//! __metadata:
//!   version: 6
//!
//! "objnest@npm:^4.1.0":
//!   version: 4.1.4
//!   resolution: "objnest@npm:4.1.4"
//!   dependencies:
//!     abind: ^1.0.0
//! ```
//!
//! An entry key lists every descriptor that resolved to the entry. The
//! package name is the first descriptor up to its first `@` past a leading
//! scope, so `string-width-cjs@npm:string-width@^4.2.0` installs as
//! `string-width-cjs`.

use crate::error::{NpmError, Result};
use crate::requirement::NpmRequirement;
use async_trait::async_trait;
use bumpgate_core::graph::{DependencyGraph, DependencyGraphBuilder, DependencyNode};
use bumpgate_core::lockfile::LockFileProvider;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

const FILE_TYPE: &str = "yarn.lock";

const METADATA_KEY: &str = "__metadata";

/// yarn.lock graph builder.
pub struct YarnLockParser;

impl YarnLockParser {
    const LOCKFILE_NAMES: &'static [&'static str] = &["yarn.lock"];
}

#[async_trait]
impl LockFileProvider for YarnLockParser {
    fn lockfile_names(&self) -> &'static [&'static str] {
        Self::LOCKFILE_NAMES
    }

    fn build_graph(&self, content: &str) -> bumpgate_core::Result<DependencyGraph> {
        Ok(parse_yarn_lock(content)?)
    }
}

/// Parses yarn.lock content into a dependency graph.
///
/// # Errors
///
/// Returns [`NpmError::YamlParse`] for a berry lock file that is not valid
/// YAML, and [`NpmError::InvalidStructure`] for classic lines that do not fit
/// the entry layout.
///
/// # Examples
///
/// ```
/// use bumpgate_npm::yarn::parse_yarn_lock;
///
/// let content = r#"
/// abind@^1.0.0:
///   version "1.0.5"
///
/// objnest@^4.1.0:
///   version "4.1.4"
///   dependencies:
///     abind "^1.0.0"
/// "#;
///
/// let graph = parse_yarn_lock(content).unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edges_to("abind").count(), 1);
/// ```
pub fn parse_yarn_lock(content: &str) -> Result<DependencyGraph> {
    if is_berry(content) {
        parse_berry(content)
    } else {
        parse_classic(content)
    }
}

fn is_berry(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.trim_end() == "__metadata:")
}

/// What an entry key says about the package it resolves.
#[derive(Debug, PartialEq, Eq)]
enum EntryKind<'a> {
    Package(&'a str),
    /// Root workspace or a `patch:` copy of a package listed elsewhere.
    Skipped,
}

/// Reads the package name from an entry key such as
/// `"@babel/core@^7.0.0", "@babel/core@^7.1.0"`.
fn entry_kind(key: &str) -> Option<EntryKind<'_>> {
    let descriptor = key
        .split(',')
        .next()
        .map(|descriptor| descriptor.trim().trim_matches('"'))
        .unwrap_or_default();

    // A leading `@` belongs to the scope, not the range separator
    let at = descriptor.get(1..)?.find('@')? + 1;
    let (name, range) = (&descriptor[..at], &descriptor[at + 1..]);
    if name.is_empty() || name == "@" {
        return None;
    }

    if range.starts_with("patch:") || range == "workspace:." {
        return Some(EntryKind::Skipped);
    }
    Some(EntryKind::Package(name))
}

fn add_package<'a>(
    builder: &mut DependencyGraphBuilder,
    name: &str,
    version: &str,
    requirements: impl IntoIterator<Item = (&'a str, &'a str)>,
) {
    let node = DependencyNode::new(name, version);
    builder.add_node(node.clone());
    for (dependency, spec) in requirements {
        let spec = spec.strip_prefix("npm:").unwrap_or(spec);
        builder.add_edge(
            node.clone(),
            dependency,
            Arc::new(NpmRequirement::parse(spec)),
        );
    }
}

/// Berry entry (partial, only fields we need).
///
/// Scalars stay as YAML values: an unquoted `1` or `2.0` is not a string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BerryEntry {
    version: Option<serde_yaml::Value>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, serde_yaml::Value>,
}

impl BerryEntry {
    fn requirements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dependencies
            .iter()
            .chain(&self.optional_dependencies)
            .chain(&self.peer_dependencies)
            .filter_map(|(name, spec)| Some((name.as_str(), spec.as_str()?)))
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_berry(content: &str) -> Result<DependencyGraph> {
    let yaml_error = |source| NpmError::YamlParse {
        file_type: FILE_TYPE.into(),
        source,
    };

    let document: BTreeMap<String, serde_yaml::Value> =
        serde_yaml::from_str(content).map_err(yaml_error)?;

    let mut builder = DependencyGraph::builder();
    for (key, value) in document {
        if key == METADATA_KEY {
            continue;
        }

        let name = match entry_kind(&key) {
            Some(EntryKind::Package(name)) => name,
            Some(EntryKind::Skipped) => {
                tracing::debug!("Skipping yarn.lock entry '{}'", key);
                continue;
            }
            None => {
                return Err(NpmError::invalid_structure(
                    FILE_TYPE,
                    0,
                    format!("cannot read a package name from '{key}'"),
                ));
            }
        };

        let entry: BerryEntry = serde_yaml::from_value(value).map_err(yaml_error)?;
        let Some(version) = entry.version.as_ref().and_then(scalar_to_string) else {
            tracing::debug!("Skipping yarn.lock entry '{}' with no version", name);
            continue;
        };

        add_package(&mut builder, name, &version, entry.requirements());
    }

    Ok(builder.build())
}

/// Classic entry being accumulated until the next header.
#[derive(Debug, Default)]
struct PendingEntry {
    name: String,
    version: Option<String>,
    requirements: Vec<(String, String)>,
    in_dependencies: bool,
}

impl PendingEntry {
    fn flush(self, builder: &mut DependencyGraphBuilder) {
        let Some(version) = &self.version else {
            tracing::debug!("Skipping yarn.lock entry '{}' with no version", self.name);
            return;
        };

        add_package(
            builder,
            &self.name,
            version,
            self.requirements
                .iter()
                .map(|(dependency, spec)| (dependency.as_str(), spec.as_str())),
        );
    }
}

enum Block {
    /// Before the first header.
    Start,
    Skipped,
    Entry(PendingEntry),
}

fn parse_classic(content: &str) -> Result<DependencyGraph> {
    let mut builder = DependencyGraph::builder();
    let mut block = Block::Start;

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let indent = raw_line.len() - raw_line.trim_start_matches(' ').len();

        if indent == 0 {
            let Some(header) = trimmed.strip_suffix(':') else {
                return Err(NpmError::invalid_structure(
                    FILE_TYPE,
                    line_number,
                    format!("expected an entry header, found '{trimmed}'"),
                ));
            };

            if let Block::Entry(entry) = std::mem::replace(&mut block, Block::Skipped) {
                entry.flush(&mut builder);
            }
            block = match entry_kind(header) {
                Some(EntryKind::Package(name)) => Block::Entry(PendingEntry {
                    name: name.to_string(),
                    ..PendingEntry::default()
                }),
                Some(EntryKind::Skipped) => Block::Skipped,
                None => {
                    return Err(NpmError::invalid_structure(
                        FILE_TYPE,
                        line_number,
                        format!("cannot read a package name from '{header}'"),
                    ));
                }
            };
            continue;
        }

        let entry = match &mut block {
            Block::Start => {
                return Err(NpmError::invalid_structure(
                    FILE_TYPE,
                    line_number,
                    "indented line outside of an entry",
                ));
            }
            Block::Skipped => continue,
            Block::Entry(entry) => entry,
        };

        let (key, value) = split_key_value(trimmed);
        match indent {
            2 => {
                entry.in_dependencies = false;
                if value.is_empty() {
                    entry.in_dependencies = matches!(
                        key,
                        "dependencies" | "optionalDependencies" | "peerDependencies"
                    );
                } else if key == "version" {
                    entry.version = Some(value.to_string());
                }
            }
            4 if entry.in_dependencies => {
                entry
                    .requirements
                    .push((key.to_string(), value.to_string()));
            }
            _ => {}
        }
    }

    if let Block::Entry(entry) = block {
        entry.flush(&mut builder);
    }

    Ok(builder.build())
}

/// Splits a classic `key "value"` line or a `key:` block header, unquoting
/// both parts.
fn split_key_value(line: &str) -> (&str, &str) {
    let (key, rest) = if let Some(quoted) = line.strip_prefix('"') {
        match quoted.find('"') {
            Some(end) => (&quoted[..end], &quoted[end + 1..]),
            None => (quoted, ""),
        }
    } else {
        match line.find([' ', ':']) {
            Some(end) => (&line[..end], &line[end..]),
            None => (line, ""),
        }
    };

    let value = rest.trim_start_matches(':').trim().trim_matches('"');
    (key, value)
}
