//! Blocking-dependent detection.
//!
//! Given a resolved [`DependencyGraph`], a dependency name, and a candidate
//! version, [`ConflictResolver`] reports every requirer whose declared
//! requirement on that dependency rejects the candidate.

use crate::graph::DependencyGraph;
use serde::{Deserialize, Serialize};

/// A resolved package that would block the proposed update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictEntry {
    /// Name of the requiring package.
    pub name: String,
    /// Resolved version of the requiring package.
    pub version: String,
    /// Requirement text as declared by the requirer.
    pub requirement: String,
    /// Human-readable summary, e.g. `objnest@4.1.2 requires abind@^1.0.0`.
    pub explanation: String,
}

/// Read-only conflict queries over one graph.
///
/// # Examples
///
/// ```
/// use bumpgate_core::conflict::ConflictResolver;
/// use bumpgate_core::graph::{DependencyGraph, DependencyNode};
/// use bumpgate_core::requirement::VersionRange;
/// use std::sync::Arc;
///
/// let mut builder = DependencyGraph::builder();
/// builder.add_edge(
///     DependencyNode::new("objnest", "4.1.2"),
///     "abind",
///     Arc::new(VersionRange::parse(">= 1.0.0, < 2")),
/// );
/// let graph = builder.build();
/// let resolver = ConflictResolver::new(&graph);
///
/// let conflicts = resolver.conflicting_dependencies("abind", "2.0.0");
/// assert_eq!(conflicts.len(), 1);
/// assert_eq!(
///     conflicts[0].explanation,
///     "objnest@4.1.2 requires abind@>= 1.0.0, < 2"
/// );
///
/// assert!(resolver.conflicting_dependencies("abind", "1.0.0").is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolver<'a> {
    graph: &'a DependencyGraph,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(graph: &'a DependencyGraph) -> Self {
        Self { graph }
    }

    /// One entry per incoming edge of `dependency_name` whose requirement
    /// rejects `target_version`.
    ///
    /// The result is in edge insertion order, but callers should treat it as
    /// a set. A dependency with no requirers yields an empty result.
    pub fn conflicting_dependencies(
        &self,
        dependency_name: &str,
        target_version: &str,
    ) -> Vec<ConflictEntry> {
        let conflicts: Vec<ConflictEntry> = self
            .graph
            .edges_to(dependency_name)
            .filter(|edge| !edge.requirement.is_satisfied_by(target_version))
            .map(|edge| {
                let requirement = edge.requirement.to_string();
                ConflictEntry {
                    explanation: format!(
                        "{}@{} requires {}@{}",
                        edge.from.name, edge.from.version, dependency_name, requirement
                    ),
                    name: edge.from.name.clone(),
                    version: edge.from.version.clone(),
                    requirement,
                }
            })
            .collect();

        tracing::debug!(
            dependency = dependency_name,
            target_version,
            conflicts = conflicts.len(),
            "resolved blocking dependents"
        );
        conflicts
    }
}

/// Shorthand for [`ConflictResolver::conflicting_dependencies`].
pub fn conflicting_dependencies(
    graph: &DependencyGraph,
    dependency_name: &str,
    target_version: &str,
) -> Vec<ConflictEntry> {
    ConflictResolver::new(graph).conflicting_dependencies(dependency_name, target_version)
}
