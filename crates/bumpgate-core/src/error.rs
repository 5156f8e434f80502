use thiserror::Error;

/// Core error types for bumpgate.
///
/// The ignore and conflict engines never fail; these errors come from the
/// outer surfaces only: loading configuration and reading lock files.
///
/// # Examples
///
/// ```
/// use bumpgate_core::error::{BumpgateError, Result};
///
/// fn read_lockfile(content: &str, file_type: &str) -> Result<()> {
///     if content.is_empty() {
///         return Err(BumpgateError::ParseError {
///             file_type: file_type.into(),
///             source: Box::new(std::io::Error::new(
///                 std::io::ErrorKind::InvalidData,
///                 "empty content"
///             )),
///         });
///     }
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum BumpgateError {
    #[error("failed to parse {file_type}: {source}")]
    ParseError {
        file_type: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown update type '{0}'")]
    InvalidUpdateType(String),

    #[error("invalid dependency name pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for `Result<T, BumpgateError>`.
pub type Result<T> = std::result::Result<T, BumpgateError>;
