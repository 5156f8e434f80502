//! Errors specific to npm and yarn lock file handling.

use thiserror::Error;

/// Errors specific to npm and yarn lock file handling.
#[derive(Error, Debug)]
pub enum NpmError {
    /// Failed to decode package-lock.json
    #[error("Failed to parse {file_type}: {source}")]
    LockfileParse {
        file_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to decode a YAML (berry) yarn.lock
    #[error("Failed to parse {file_type}: {source}")]
    YamlParse {
        file_type: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Lock file decoded but does not have the expected layout
    #[error("Invalid {file_type} structure at line {line}: {message}")]
    InvalidStructure {
        file_type: String,
        line: usize,
        message: String,
    },
}

/// Result type alias for npm operations.
pub type Result<T> = std::result::Result<T, NpmError>;

impl NpmError {
    /// Create an invalid structure error.
    pub fn invalid_structure(
        file_type: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidStructure {
            file_type: file_type.into(),
            line,
            message: message.into(),
        }
    }

    /// Name of the lock file dialect the error came from.
    pub fn file_type(&self) -> &str {
        match self {
            Self::LockfileParse { file_type, .. }
            | Self::YamlParse { file_type, .. }
            | Self::InvalidStructure { file_type, .. } => file_type,
        }
    }
}

/// Convert to bumpgate_core::BumpgateError for interoperability
impl From<NpmError> for bumpgate_core::BumpgateError {
    fn from(err: NpmError) -> Self {
        match err {
            NpmError::LockfileParse { file_type, source } => Self::ParseError {
                file_type,
                source: Box::new(source),
            },
            NpmError::YamlParse { file_type, source } => Self::ParseError {
                file_type,
                source: Box::new(source),
            },
            other => Self::ParseError {
                file_type: other.file_type().to_string(),
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NpmError::invalid_structure("yarn.lock", 7, "dependency outside of an entry");
        assert_eq!(
            err.to_string(),
            "Invalid yarn.lock structure at line 7: dependency outside of an entry"
        );
    }

    #[test]
    fn test_conversion_to_core_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err = NpmError::LockfileParse {
            file_type: "package-lock.json".into(),
            source: json_err,
        };
        let core_err: bumpgate_core::BumpgateError = err.into();
        assert!(
            core_err
                .to_string()
                .starts_with("failed to parse package-lock.json")
        );

        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("key: [1").unwrap_err();
        let err = NpmError::YamlParse {
            file_type: "yarn.lock".into(),
            source: yaml_err,
        };
        assert_eq!(err.file_type(), "yarn.lock");
        let core_err: bumpgate_core::BumpgateError = err.into();
        assert!(core_err.to_string().starts_with("failed to parse yarn.lock"));

        let err = NpmError::invalid_structure("yarn.lock", 3, "bad indent");
        let core_err: bumpgate_core::BumpgateError = err.into();
        assert!(core_err.to_string().contains("bad indent"));
    }
}
