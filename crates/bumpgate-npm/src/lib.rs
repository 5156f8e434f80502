//! npm and yarn lock file support for bumpgate.
//!
//! Builds [`bumpgate_core::DependencyGraph`]s from package-lock.json,
//! npm-shrinkwrap.json, and yarn.lock, with requirements evaluated using npm
//! range semantics.

pub mod error;
pub mod lockfile;
pub mod requirement;
pub mod yarn;

pub use error::{NpmError, Result};
pub use lockfile::NpmLockParser;
pub use requirement::NpmRequirement;
pub use yarn::{YarnLockParser, parse_yarn_lock};

use bumpgate_core::LockFileProvider;
use std::path::Path;

/// Picks the provider for a lock file by its file name.
///
/// # Examples
///
/// ```
/// use bumpgate_npm::lockfile_provider_for;
/// use std::path::Path;
///
/// assert!(lockfile_provider_for(Path::new("app/yarn.lock")).is_some());
/// assert!(lockfile_provider_for(Path::new("app/package-lock.json")).is_some());
/// assert!(lockfile_provider_for(Path::new("app/Cargo.lock")).is_none());
/// ```
pub fn lockfile_provider_for(lockfile_path: &Path) -> Option<Box<dyn LockFileProvider>> {
    let file_name = lockfile_path.file_name()?.to_str()?;

    let providers: [Box<dyn LockFileProvider>; 2] =
        [Box::new(NpmLockParser), Box::new(YarnLockParser)];
    providers
        .into_iter()
        .find(|provider| provider.lockfile_names().contains(&file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_by_file_name() {
        let npm = lockfile_provider_for(Path::new("npm-shrinkwrap.json")).unwrap();
        assert!(npm.lockfile_names().contains(&"package-lock.json"));

        let yarn = lockfile_provider_for(Path::new("/repo/yarn.lock")).unwrap();
        assert_eq!(yarn.lockfile_names(), &["yarn.lock"]);
    }

    #[test]
    fn test_unknown_file_name() {
        assert!(lockfile_provider_for(Path::new("pnpm-lock.yaml")).is_none());
        assert!(lockfile_provider_for(Path::new("/")).is_none());
    }
}
