//! Error types for the puzzle engine.
//!
//! Most failures never reach the host: exhausted generation falls back to the
//! safe pattern and persistence failures fall back to a fresh player model.
//! What remains visible is configuration mistakes and caller bugs such as an
//! option id that does not belong to the puzzle.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed configuration, theme, or pattern lookup with no candidate.
    #[error("Configuration error: {reason}")]
    Configuration {
        reason: String,
    },

    /// Caller passed something that does not belong to the puzzle.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Host persistence service failed or returned unusable data.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Every generation attempt failed quality screening.
    #[error("Generation exhausted after {attempts} attempts")]
    GenerationExhausted {
        attempts: u32,
    },

    /// A session operation is not allowed in the current lifecycle state.
    #[error("Cannot {action} a puzzle that is {state}")]
    InvalidTransition {
        state: String,
        action: &'static str,
    },
}

impl EngineError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into() }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = EngineError::config("window must be positive");
        assert_eq!(err.to_string(), "Configuration error: window must be positive");

        let err = EngineError::InvalidTransition { state: "resolved".into(), action: "answer" };
        assert_eq!(err.to_string(), "Cannot answer a puzzle that is resolved");
        assert!(err.is_invalid_transition());
    }
}
