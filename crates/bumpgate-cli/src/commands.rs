//! Subcommand implementations. Each returns the JSON document to print.

use bumpgate_core::{BumpgateError, Result, UpdateConfig, conflicting_dependencies};
use bumpgate_npm::lockfile_provider_for;
use std::path::Path;

pub(crate) async fn ignored(
    config_path: &Path,
    dependency: &str,
    current_version: Option<&str>,
) -> Result<String> {
    let config = UpdateConfig::load(config_path).await?;
    let ranges = config.ignored_versions_for(dependency, current_version);

    tracing::info!("{} ignored ranges for {}", ranges.len(), dependency);
    Ok(serde_json::to_string_pretty(&ranges)?)
}

pub(crate) async fn conflicts(
    lockfile_path: &Path,
    dependency: &str,
    target_version: &str,
) -> Result<String> {
    let provider = lockfile_provider_for(lockfile_path).ok_or_else(|| {
        BumpgateError::InvalidConfig(format!(
            "unsupported lock file: {}",
            lockfile_path.display()
        ))
    })?;

    let graph = provider.parse_lockfile(lockfile_path).await?;
    let conflicts = conflicting_dependencies(&graph, dependency, target_version);

    tracing::info!(
        "{} packages block {}@{}",
        conflicts.len(),
        dependency,
        target_version
    );
    Ok(serde_json::to_string_pretty(&conflicts)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
  "ignore": [
    { "dependency-name": "express", "versions": ["5.x"] },
    { "dependency-name": "@types/*", "update-types": ["version-update:semver-major"] }
  ]
}"#;

    const LOCKFILE: &str = r#"{
  "lockfileVersion": 3,
  "packages": {
    "": { "dependencies": { "objnest": "^4.1.0" } },
    "node_modules/objnest": { "version": "4.1.2", "dependencies": { "abind": "^1.0.0" } },
    "node_modules/abind": { "version": "1.0.5" }
  }
}"#;

    #[tokio::test]
    async fn test_ignored_update_types() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("bumpgate.json");
        std::fs::write(&config_path, CONFIG).unwrap();

        let output = ignored(&config_path, "@types/node", Some("18.11.9"))
            .await
            .unwrap();
        let ranges: Vec<String> = serde_json::from_str(&output).unwrap();
        assert_eq!(ranges, vec![">= 19.a, < 20"]);
    }

    #[tokio::test]
    async fn test_ignored_unmatched_dependency() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("bumpgate.json");
        std::fs::write(&config_path, CONFIG).unwrap();

        let output = ignored(&config_path, "lodash", Some("4.17.21")).await.unwrap();
        assert_eq!(output, "[]");
    }

    #[tokio::test]
    async fn test_ignored_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = ignored(&temp_dir.path().join("missing.json"), "express", None).await;
        assert!(matches!(result, Err(BumpgateError::Io(_))));
    }

    #[tokio::test]
    async fn test_conflicts_report() {
        let temp_dir = tempfile::tempdir().unwrap();
        let lockfile_path = temp_dir.path().join("package-lock.json");
        std::fs::write(&lockfile_path, LOCKFILE).unwrap();

        let output = conflicts(&lockfile_path, "abind", "2.0.0").await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "name": "objnest",
                "version": "4.1.2",
                "requirement": "^1.0.0",
                "explanation": "objnest@4.1.2 requires abind@^1.0.0"
            }])
        );
    }

    #[tokio::test]
    async fn test_conflicts_unsupported_lockfile() {
        let result = conflicts(Path::new("Gemfile.lock"), "rake", "13.0.0").await;
        assert!(matches!(result, Err(BumpgateError::InvalidConfig(_))));
    }
}
