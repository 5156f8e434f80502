//! package-lock.json graph building.
//!
//! Builds a dependency graph from package-lock.json and npm-shrinkwrap.json,
//! for every lock file version npm has written.
//!
//! # package-lock.json Format
//!
//! Versions 2 and 3 describe every installed package in a flat "packages"
//! object keyed by install path:
//!
//! ```json
//! {
//!   "lockfileVersion": 3,
//!   "packages": {
//!     "": { "name": "my-project", "dependencies": { "objnest": "^4.1.0" } },
//!     "node_modules/objnest": {
//!       "version": "4.1.2",
//!       "dependencies": { "abind": "^1.0.0" }
//!     },
//!     "node_modules/abind": { "version": "1.0.5" }
//!   }
//! }
//! ```
//!
//! Version 1 nests packages under "dependencies" and lists each package's
//! own requirements under "requires":
//!
//! ```json
//! {
//!   "lockfileVersion": 1,
//!   "dependencies": {
//!     "objnest": { "version": "4.1.2", "requires": { "abind": "^1.0.0" } },
//!     "abind": { "version": "1.0.5" }
//!   }
//! }
//! ```
//!
//! The root project ("" in v2/v3, implicit in v1) is not a node: its
//! requirements are the manifest's own and are what an update edits.

use crate::error::NpmError;
use crate::requirement::NpmRequirement;
use async_trait::async_trait;
use bumpgate_core::error::Result;
use bumpgate_core::graph::{DependencyGraph, DependencyGraphBuilder, DependencyNode};
use bumpgate_core::lockfile::LockFileProvider;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// package-lock.json / npm-shrinkwrap.json graph builder.
///
/// # Examples
///
/// ```
/// use bumpgate_core::{LockFileProvider, conflicting_dependencies};
/// use bumpgate_npm::NpmLockParser;
///
/// let lockfile = r#"{
///   "lockfileVersion": 3,
///   "packages": {
///     "": { "dependencies": { "objnest": "^4.1.0" } },
///     "node_modules/objnest": { "version": "4.1.2", "dependencies": { "abind": "^1.0.0" } },
///     "node_modules/abind": { "version": "1.0.5" }
///   }
/// }"#;
///
/// let graph = NpmLockParser.build_graph(lockfile).unwrap();
/// let conflicts = conflicting_dependencies(&graph, "abind", "2.0.0");
/// assert_eq!(conflicts[0].explanation, "objnest@4.1.2 requires abind@^1.0.0");
/// ```
pub struct NpmLockParser;

impl NpmLockParser {
    /// Lock file names for npm, shrinkwrap first as npm itself prefers it.
    const LOCKFILE_NAMES: &'static [&'static str] = &["npm-shrinkwrap.json", "package-lock.json"];
}

/// package-lock.json structure (partial, only fields we need).
#[derive(Debug, Deserialize)]
struct PackageLockJson {
    /// v2/v3 flat package map
    #[serde(default)]
    packages: BTreeMap<String, PackageEntry>,

    /// v1 nested dependency tree
    #[serde(default)]
    dependencies: BTreeMap<String, LegacyEntry>,
}

/// Entry in the v2/v3 "packages" object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageEntry {
    name: Option<String>,
    version: Option<String>,
    link: Option<bool>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, String>,
}

impl PackageEntry {
    fn requirements(&self) -> impl Iterator<Item = (&String, &String)> {
        self.dependencies
            .iter()
            .chain(&self.optional_dependencies)
            .chain(&self.peer_dependencies)
    }
}

/// Entry in the v1 "dependencies" tree.
#[derive(Debug, Deserialize)]
struct LegacyEntry {
    version: Option<String>,
    #[serde(default)]
    requires: BTreeMap<String, String>,
    #[serde(default)]
    dependencies: BTreeMap<String, LegacyEntry>,
}

#[async_trait]
impl LockFileProvider for NpmLockParser {
    fn lockfile_names(&self) -> &'static [&'static str] {
        Self::LOCKFILE_NAMES
    }

    fn build_graph(&self, content: &str) -> Result<DependencyGraph> {
        let lock_data: PackageLockJson =
            serde_json::from_str(content).map_err(|source| NpmError::LockfileParse {
                file_type: "package-lock.json".into(),
                source,
            })?;

        let mut builder = DependencyGraph::builder();
        if lock_data.packages.is_empty() {
            add_legacy_tree(&lock_data.dependencies, &mut builder);
        } else {
            add_packages(&lock_data.packages, &mut builder);
        }
        Ok(builder.build())
    }
}

fn add_packages(packages: &BTreeMap<String, PackageEntry>, builder: &mut DependencyGraphBuilder) {
    for (key, entry) in packages {
        // Skip root package (empty key)
        if key.is_empty() {
            continue;
        }

        // Links point at another "packages" entry which carries the data
        if entry.link == Some(true) {
            continue;
        }

        let name = entry
            .name
            .as_deref()
            .unwrap_or_else(|| extract_package_name(key));

        let Some(version) = &entry.version else {
            tracing::debug!("Skipping package '{}' with no version", name);
            continue;
        };

        let node = DependencyNode::new(name, version.as_str());
        builder.add_node(node.clone());
        for (dependency, spec) in entry.requirements() {
            builder.add_edge(
                node.clone(),
                dependency.as_str(),
                Arc::new(NpmRequirement::parse(spec)),
            );
        }
    }
}

fn add_legacy_tree(dependencies: &BTreeMap<String, LegacyEntry>, builder: &mut DependencyGraphBuilder) {
    for (name, entry) in dependencies {
        if let Some(version) = &entry.version {
            let node = DependencyNode::new(name.as_str(), version.as_str());
            builder.add_node(node.clone());
            for (dependency, spec) in &entry.requires {
                builder.add_edge(
                    node.clone(),
                    dependency.as_str(),
                    Arc::new(NpmRequirement::parse(spec)),
                );
            }
        } else {
            tracing::debug!("Skipping package '{}' with no version", name);
        }

        add_legacy_tree(&entry.dependencies, builder);
    }
}

/// Extracts package name from lockfile key.
///
/// # Examples
///
/// - `"node_modules/express"` → `"express"`
/// - `"node_modules/@babel/core"` → `"@babel/core"`
/// - `"node_modules/express/node_modules/debug"` → `"debug"`
fn extract_package_name(key: &str) -> &str {
    key.rsplit("node_modules/").next().unwrap_or(key)
}
