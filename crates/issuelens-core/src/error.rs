use std::path::PathBuf;

/// Errors that can occur while loading and analyzing issue data.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate turns it into a `miette` report at the boundary.
///
/// Only whole-run failures live here. A single malformed label, event, or
/// date is skipped by the loader instead of producing an error.
///
/// # Examples
///
/// ```
/// use issuelens_core::IssueLensError;
///
/// let err = IssueLensError::Config("top_n must be positive".into());
/// assert!(err.to_string().contains("top_n must be positive"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum IssueLensError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(issuelens::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(issuelens::config))]
    Config(String),

    /// The input document does not have the expected shape.
    #[error("invalid issue data: {0}")]
    #[diagnostic(
        code(issuelens::data),
        help("the input must be a JSON array of issue objects")
    )]
    Data(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(issuelens::json))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(issuelens::toml))]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(issuelens::not_found))]
    FileNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: IssueLensError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn data_error_displays_message() {
        let err = IssueLensError::Data("expected an array".into());
        assert_eq!(err.to_string(), "invalid issue data: expected an array");
    }

    #[test]
    fn json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: IssueLensError = json_err.into();
        assert!(err.to_string().starts_with("serialization error"));
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = IssueLensError::FileNotFound(PathBuf::from("/tmp/poetry_issues.json"));
        assert!(err.to_string().contains("/tmp/poetry_issues.json"));
    }
}
