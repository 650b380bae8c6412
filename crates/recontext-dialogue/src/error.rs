//! Error types for the turn pipeline and session manager.
//!
//! Recoverable per-turn conditions (missing context, degraded classifier) are
//! not errors; they are reported as
//! [`TurnDiagnostic`](crate::controller::TurnDiagnostic) values.

use recontext_core::error::RecontextError;

/// Errors from the dialogue engine.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("utterance cannot be empty")]
    EmptyUtterance,
    #[error("utterance exceeds maximum length of {0} characters")]
    UtteranceTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("lexicon error: {0}")]
    Lexicon(String),
    #[error("session lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<regex::Error> for DialogueError {
    fn from(err: regex::Error) -> Self {
        DialogueError::Lexicon(err.to_string())
    }
}

impl From<DialogueError> for RecontextError {
    fn from(err: DialogueError) -> Self {
        RecontextError::Dialogue(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_display_empty() {
        assert_eq!(
            DialogueError::EmptyUtterance.to_string(),
            "utterance cannot be empty"
        );
    }

    #[test]
    fn test_display_too_long() {
        assert_eq!(
            DialogueError::UtteranceTooLong(2000).to_string(),
            "utterance exceeds maximum length of 2000 characters"
        );
    }

    #[test]
    fn test_display_session_not_found() {
        let id = Uuid::nil();
        assert_eq!(
            DialogueError::SessionNotFound(id).to_string(),
            format!("session not found: {}", id)
        );
    }

    #[test]
    fn test_regex_error_conversion() {
        let err: DialogueError = regex::Regex::new("(unclosed").unwrap_err().into();
        assert!(matches!(err, DialogueError::Lexicon(_)));
    }

    #[test]
    fn test_into_recontext_error() {
        let err: RecontextError = DialogueError::EmptyUtterance.into();
        assert!(matches!(err, RecontextError::Dialogue(_)));
    }

    #[test]
    fn test_error_is_debug() {
        let err = DialogueError::LockPoisoned("sessions".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("LockPoisoned"));
    }
}
