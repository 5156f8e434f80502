//! Update configuration.
//!
//! Holds the ignore conditions of one update configuration and answers
//! "which ranges are ignored for this dependency" across all of them.
//!
//! # Format
//!
//! ```json
//! {
//!   "ignore": [
//!     { "dependency-name": "express", "versions": [">= 5"] },
//!     { "dependency-name": "@types/*", "update-types": ["version-update:semver-patch"] },
//!     { "dependency-name": "left-pad" }
//!   ]
//! }
//! ```
//!
//! `dependency-name` is a case-insensitive glob where `*` matches any run of
//! characters, including `/`.

use crate::error::{BumpgateError, Result};
use crate::ignore::IgnoreCondition;
use globset::{Glob, GlobBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    #[serde(default)]
    pub ignore: Vec<IgnoreCondition>,
}

impl UpdateConfig {
    pub fn new(ignore: Vec<IgnoreCondition>) -> Self {
        Self { ignore }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use bumpgate_core::config::UpdateConfig;
    ///
    /// let config = UpdateConfig::from_json_str(r#"{
    ///     "ignore": [{ "dependency-name": "left-pad" }]
    /// }"#).unwrap();
    ///
    /// assert_eq!(config.ignored_versions_for("left-pad", Some("1.3.0")), vec![">= 0"]);
    /// assert!(config.ignored_versions_for("right-pad", Some("1.3.0")).is_empty());
    /// ```
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub async fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Loading update config: {}", path.display());

        let content = tokio::fs::read_to_string(path).await?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| BumpgateError::ParseError {
                file_type: format!("update config at {}", path.display()),
                source: Box::new(e),
            })?;
        config.validate()?;

        tracing::info!(
            "Loaded update config: {} ignore conditions from {}",
            config.ignore.len(),
            path.display()
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for condition in &self.ignore {
            if condition.dependency_name.trim().is_empty() {
                return Err(BumpgateError::InvalidConfig(
                    "ignore condition without dependency-name".into(),
                ));
            }
            name_glob(&condition.dependency_name).map_err(|source| {
                BumpgateError::InvalidPattern {
                    pattern: condition.dependency_name.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }

    /// Conditions whose `dependency-name` pattern matches `dependency_name`.
    pub fn conditions_for<'a>(
        &'a self,
        dependency_name: &'a str,
    ) -> impl Iterator<Item = &'a IgnoreCondition> + 'a {
        self.ignore
            .iter()
            .filter(move |condition| name_matches(&condition.dependency_name, dependency_name))
    }

    /// Ignored ranges from every matching condition, in condition order,
    /// without duplicates.
    pub fn ignored_versions_for(
        &self,
        dependency_name: &str,
        current_version: Option<&str>,
    ) -> Vec<String> {
        let mut ranges: Vec<String> = Vec::new();
        for condition in self.conditions_for(dependency_name) {
            for range in condition.ignored_versions(current_version) {
                let range = range.to_string();
                if !ranges.contains(&range) {
                    ranges.push(range);
                }
            }
        }
        ranges
    }
}

fn name_glob(pattern: &str) -> std::result::Result<Glob, globset::Error> {
    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(false)
        .build()
}

fn name_matches(pattern: &str, name: &str) -> bool {
    match name_glob(pattern) {
        Ok(glob) => glob.compile_matcher().is_match(name),
        Err(_) => pattern.eq_ignore_ascii_case(name),
    }
}
