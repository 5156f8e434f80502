//! Lock file abstractions.
//!
//! A [`LockFileProvider`] turns one lock file dialect (package-lock.json,
//! yarn.lock, ...) into a [`DependencyGraph`]. Graph construction is a pure
//! function of the file content; reading and locating files are layered on
//! top so that dialect parsers stay testable on plain strings.

use crate::error::{BumpgateError, Result};
use crate::graph::DependencyGraph;
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Maximum number of parent directories searched for a workspace lock file.
const MAX_WORKSPACE_DEPTH: usize = 5;

/// Finds a lock file next to `manifest_path`, or in one of its parent
/// directories (up to 5 levels) for workspace layouts.
///
/// `lockfile_names` are tried in order at each level.
pub fn locate_lockfile_for_manifest(
    manifest_path: &Path,
    lockfile_names: &[&str],
) -> Option<PathBuf> {
    let mut current_dir = manifest_path.parent()?;

    for depth in 0..=MAX_WORKSPACE_DEPTH {
        for name in lockfile_names {
            let candidate = current_dir.join(name);
            if candidate.exists() {
                tracing::debug!(
                    "Found {} at depth {}: {}",
                    name,
                    depth,
                    candidate.display()
                );
                return Some(candidate);
            }
        }
        current_dir = current_dir.parent()?;
    }

    tracing::debug!("No lock file found for: {}", manifest_path.display());
    None
}

/// Lock file dialect adapter.
///
/// # Examples
///
/// ```
/// use bumpgate_core::error::Result;
/// use bumpgate_core::graph::{DependencyGraph, DependencyNode};
/// use bumpgate_core::lockfile::LockFileProvider;
///
/// struct PinList;
///
/// impl LockFileProvider for PinList {
///     fn lockfile_names(&self) -> &'static [&'static str] {
///         &["pins.txt"]
///     }
///
///     fn build_graph(&self, content: &str) -> Result<DependencyGraph> {
///         let mut builder = DependencyGraph::builder();
///         for line in content.lines() {
///             if let Some((name, version)) = line.split_once(' ') {
///                 builder.add_node(DependencyNode::new(name, version));
///             }
///         }
///         Ok(builder.build())
///     }
/// }
///
/// let graph = PinList.build_graph("abind 1.0.5\nobjnest 4.1.2").unwrap();
/// assert_eq!(graph.node_count(), 2);
/// ```
#[async_trait]
pub trait LockFileProvider: Send + Sync {
    /// File names this dialect is stored under, in lookup priority order.
    fn lockfile_names(&self) -> &'static [&'static str];

    /// Builds the dependency graph from lock file content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid for this dialect.
    fn build_graph(&self, content: &str) -> Result<DependencyGraph>;

    /// Locates the lock file for a manifest path.
    fn locate_lockfile(&self, manifest_path: &Path) -> Option<PathBuf> {
        locate_lockfile_for_manifest(manifest_path, self.lockfile_names())
    }

    /// Reads a lock file and builds its graph.
    async fn parse_lockfile(&self, lockfile_path: &Path) -> Result<DependencyGraph> {
        tracing::debug!("Parsing lock file: {}", lockfile_path.display());

        let content = tokio::fs::read_to_string(lockfile_path)
            .await
            .map_err(|e| BumpgateError::ParseError {
                file_type: format!("lock file at {}", lockfile_path.display()),
                source: Box::new(e),
            })?;

        let graph = self.build_graph(&content)?;

        tracing::info!(
            "Parsed lock file: {} packages, {} requirements from {}",
            graph.node_count(),
            graph.edge_count(),
            lockfile_path.display()
        );
        Ok(graph)
    }

    /// Checks if the lock file has been modified since `last_modified`.
    ///
    /// A file that cannot be stat'd counts as stale.
    fn is_lockfile_stale(&self, lockfile_path: &Path, last_modified: SystemTime) -> bool {
        if let Ok(metadata) = std::fs::metadata(lockfile_path)
            && let Ok(mtime) = metadata.modified()
        {
            return mtime > last_modified;
        }
        true
    }
}

struct CachedGraph {
    graph: Arc<DependencyGraph>,
    modified_at: SystemTime,
}

/// Cache of built graphs keyed by lock file path.
///
/// Entries are reused until the file's modification time changes, so one
/// graph can serve every conflict query of an analysis run.
pub struct LockFileCache {
    entries: DashMap<PathBuf, CachedGraph>,
}

impl LockFileCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached graph, or parses the lock file if it is new or has
    /// changed on disk.
    pub async fn get_or_parse(
        &self,
        provider: &dyn LockFileProvider,
        lockfile_path: &Path,
    ) -> Result<Arc<DependencyGraph>> {
        if let Some(cached) = self.entries.get(lockfile_path)
            && let Ok(metadata) = tokio::fs::metadata(lockfile_path).await
            && let Ok(mtime) = metadata.modified()
            && mtime <= cached.modified_at
        {
            tracing::debug!("Lock file cache hit: {}", lockfile_path.display());
            return Ok(Arc::clone(&cached.graph));
        }

        tracing::debug!("Lock file cache miss: {}", lockfile_path.display());
        let graph = Arc::new(provider.parse_lockfile(lockfile_path).await?);

        let modified_at = tokio::fs::metadata(lockfile_path).await?.modified()?;
        self.entries.insert(
            lockfile_path.to_path_buf(),
            CachedGraph {
                graph: Arc::clone(&graph),
                modified_at,
            },
        );

        Ok(graph)
    }

    /// Forces the next access to re-parse the file.
    pub fn invalidate(&self, lockfile_path: &Path) {
        self.entries.remove(lockfile_path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LockFileCache {
    fn default() -> Self {
        Self::new()
    }
}
