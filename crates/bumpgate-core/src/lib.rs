//! Core engines for bumpgate.
//!
//! bumpgate decides which candidate versions of a dependency may be proposed
//! as updates, and which resolved packages would block a specific candidate.
//!
//! # Architecture
//!
//! bumpgate-core defines:
//! - **Version model**: [`Version`] parsing and ordering for any version string
//! - **Requirements**: [`VersionRange`] and the [`VersionRequirement`] seam used by graph edges
//! - **Ignore rules**: [`IgnoreCondition`] and [`UpdateConfig`], producing ranges to exclude
//! - **Conflict resolution**: [`DependencyGraph`] and [`ConflictResolver`]
//! - **Lock files**: the [`LockFileProvider`] trait implemented per lock file dialect
//!
//! # Examples
//!
//! ```
//! use bumpgate_core::{IgnoreCondition, UpdateClass};
//!
//! let condition = IgnoreCondition::new("abind")
//!     .with_update_types([UpdateClass::Major, UpdateClass::Patch]);
//!
//! let ranges: Vec<String> = condition
//!     .ignored_versions(Some("1.2.3"))
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(ranges, vec![">= 2.a, < 3", ">= 1.2.a, < 1.3"]);
//! ```

pub mod config;
pub mod conflict;
pub mod error;
pub mod graph;
pub mod ignore;
pub mod lockfile;
pub mod requirement;
pub mod version;

// Re-export commonly used types
pub use config::UpdateConfig;
pub use conflict::{ConflictEntry, ConflictResolver, conflicting_dependencies};
pub use error::{BumpgateError, Result};
pub use graph::{DependencyEdge, DependencyGraph, DependencyGraphBuilder, DependencyNode};
pub use ignore::{IgnoreCondition, UpdateClass};
pub use lockfile::{LockFileCache, LockFileProvider, locate_lockfile_for_manifest};
pub use requirement::{Comparator, Constraint, VersionRange, VersionRequirement};
pub use version::{Component, Version};
