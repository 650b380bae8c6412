//! Error types for loading classifier artifacts.

use recontext_core::error::RecontextError;

/// Errors raised while loading or validating a classifier artifact.
///
/// Classification itself never fails; these only surface at load time.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact parse error: {0}")]
    Parse(String),
    #[error("unsupported artifact format version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        ClassifierError::Parse(err.to_string())
    }
}

impl From<ClassifierError> for RecontextError {
    fn from(err: ClassifierError) -> Self {
        RecontextError::Classifier(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_artifact() {
        let err = ClassifierError::InvalidArtifact("idf length 3 != vocabulary size 4".to_string());
        assert_eq!(
            err.to_string(),
            "invalid artifact: idf length 3 != vocabulary size 4"
        );
    }

    #[test]
    fn test_display_unsupported_version() {
        assert_eq!(
            ClassifierError::UnsupportedVersion(7).to_string(),
            "unsupported artifact format version 7"
        );
    }

    #[test]
    fn test_from_json_error() {
        let bad: Result<serde_json::Value, _> = serde_json::from_str("[1, 2");
        let err: ClassifierError = bad.unwrap_err().into();
        assert!(matches!(err, ClassifierError::Parse(_)));
    }

    #[test]
    fn test_into_recontext_error() {
        let err: RecontextError = ClassifierError::Parse("eof".to_string()).into();
        assert!(matches!(err, RecontextError::Classifier(_)));
        assert!(err.to_string().contains("eof"));
    }
}
