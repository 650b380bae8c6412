use thiserror::Error;

/// Top-level error type for the Recontext system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for RecontextError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecontextError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Dialogue error: {0}")]
    Dialogue(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for RecontextError {
    fn from(err: toml::de::Error) -> Self {
        RecontextError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RecontextError {
    fn from(err: toml::ser::Error) -> Self {
        RecontextError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RecontextError {
    fn from(err: serde_json::Error) -> Self {
        RecontextError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Recontext operations.
pub type Result<T> = std::result::Result<T, RecontextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecontextError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RecontextError = io_err.into();
        assert!(matches!(err, RecontextError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let bad: std::result::Result<toml::Value, _> = toml::from_str("[general\nlog_level =");
        let err: RecontextError = bad.unwrap_err().into();
        assert!(matches!(err, RecontextError::Config(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: RecontextError = bad.unwrap_err().into();
        assert!(matches!(err, RecontextError::Serialization(_)));
    }
}
