//! Resolved dependency graph.
//!
//! A [`DependencyGraph`] is what a lock file provider hands to the conflict
//! resolver: resolved package instances plus "requirer declares a requirement
//! on name" edges. It is immutable once built and can be shared freely
//! between threads.

use crate::requirement::VersionRequirement;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// One resolved package instance from a lock file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyNode {
    pub name: String,
    /// Exact version pinned by the lock file.
    pub version: String,
}

impl DependencyNode {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for DependencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// `from` declares a dependency on `to_name` satisfying `requirement`.
#[derive(Debug, Clone)]
pub struct DependencyEdge {
    pub from: DependencyNode,
    pub to_name: String,
    pub requirement: Arc<dyn VersionRequirement>,
}

/// Immutable set of resolved packages and requirement edges.
///
/// # Examples
///
/// ```
/// use bumpgate_core::graph::{DependencyGraph, DependencyNode};
/// use bumpgate_core::requirement::VersionRange;
/// use std::sync::Arc;
///
/// let mut builder = DependencyGraph::builder();
/// builder.add_node(DependencyNode::new("abind", "1.0.5"));
/// builder.add_edge(
///     DependencyNode::new("objnest", "4.1.2"),
///     "abind",
///     Arc::new(VersionRange::parse(">= 1.0, < 2")),
/// );
/// let graph = builder.build();
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edges_to("abind").count(), 1);
/// assert_eq!(graph.edges_to("objnest").count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<DependencyNode>,
    edges: Vec<DependencyEdge>,
    incoming: HashMap<String, Vec<usize>>,
}

impl DependencyGraph {
    pub fn builder() -> DependencyGraphBuilder {
        DependencyGraphBuilder::default()
    }

    pub fn nodes(&self) -> &[DependencyNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Edges whose target is `name`, in insertion order.
    pub fn edges_to<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = &'a DependencyEdge> + use<'a> {
        self.incoming
            .get(name)
            .into_iter()
            .flatten()
            .map(|&index| &self.edges[index])
    }

    /// Resolved versions of every instance of `name`.
    pub fn versions_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.nodes
            .iter()
            .filter(move |node| node.name == name)
            .map(|node| node.version.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Accumulates nodes and edges, collapsing literal duplicates.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    nodes: Vec<DependencyNode>,
    seen_nodes: HashSet<DependencyNode>,
    edges: Vec<DependencyEdge>,
    seen_edges: HashSet<(DependencyNode, String, String)>,
}

impl DependencyGraphBuilder {
    /// Adds a node. Returns false if it was already present.
    pub fn add_node(&mut self, node: DependencyNode) -> bool {
        if self.seen_nodes.contains(&node) {
            return false;
        }
        self.seen_nodes.insert(node.clone());
        self.nodes.push(node);
        true
    }

    /// Adds an edge, registering `from` as a node if needed.
    ///
    /// Returns false if an edge with the same requirer, target, and
    /// requirement text was already added.
    pub fn add_edge(
        &mut self,
        from: DependencyNode,
        to_name: impl Into<String>,
        requirement: Arc<dyn VersionRequirement>,
    ) -> bool {
        let to_name = to_name.into();
        let key = (from.clone(), to_name.clone(), requirement.to_string());
        if !self.seen_edges.insert(key) {
            return false;
        }
        self.add_node(from.clone());
        self.edges.push(DependencyEdge {
            from,
            to_name,
            requirement,
        });
        true
    }

    pub fn build(self) -> DependencyGraph {
        let mut incoming: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, edge) in self.edges.iter().enumerate() {
            incoming
                .entry(edge.to_name.clone())
                .or_default()
                .push(index);
        }

        DependencyGraph {
            nodes: self.nodes,
            edges: self.edges,
            incoming,
        }
    }
}
