//! Error Types
//!
//! Typed errors for the orchestration pipeline. Every failure that can reach
//! the user is converted into a single human-readable string at the
//! orchestrator boundary (see [`crate::state::AppState`]), so these types
//! carry enough context to be displayed as-is.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while generating a concept or a build script
#[derive(Debug, Error)]
pub enum GenerationError {
    /// An attached file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Digest {
        /// The file that failed
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// The AI service failed while generating the concept
    #[error("Failed to generate OS concept from API: {0}")]
    ConceptService(String),

    /// The concept response was not valid JSON for the concept shape
    #[error("Failed to generate OS concept from API: {0}")]
    ConceptParse(#[from] serde_json::Error),

    /// The AI service failed while generating the build script
    #[error("Failed to generate build script from API: {0}")]
    ScriptService(String),

    /// The script response was empty after fence stripping
    #[error("Failed to generate build script from API: the response contained no script")]
    EmptyScript,
}

/// Rejected state transitions
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// Neither a prompt nor any files were supplied
    #[error("Please provide a prompt or attach some files to start.")]
    Validation,

    /// A generation or build is already in flight
    #[error("A request is already in progress")]
    Busy,

    /// A build was requested before any concept exists
    #[error("Generate an OS concept before building it")]
    NoConcept,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_carry_underlying_message() {
        let err = GenerationError::ConceptService("503 Service Unavailable".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to generate OS concept from API: 503 Service Unavailable"
        );

        let err = GenerationError::ScriptService("timed out".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to generate build script from API: timed out"
        );
    }

    #[test]
    fn test_digest_error_names_the_file() {
        let err = GenerationError::Digest {
            path: PathBuf::from("/tmp/notes.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "Failed to read /tmp/notes.txt: gone");
    }

    #[test]
    fn test_parse_error_is_reported_like_a_service_error() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = GenerationError::from(source);
        assert!(err
            .to_string()
            .starts_with("Failed to generate OS concept from API:"));
    }
}
