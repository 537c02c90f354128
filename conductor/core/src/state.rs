//! Application State
//!
//! The orchestrator's state as a plain struct with explicit transitions.
//! Transitions never perform IO; the [`crate::Conductor`] runs the async work
//! and reports the outcome back through them.
//!
//! Invariant: `generating` and `building` are never both set.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::concept::OsConcept;
use crate::error::{GenerationError, StateError};

/// A file the user attached as context
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedFile {
    /// Where the file lives
    pub path: PathBuf,
    /// File name shown to the user
    pub name: String,
    /// Size at attach time
    pub size_bytes: u64,
}

impl AttachedFile {
    /// Describe a file already known to exist
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        let path = path.into();
        Self {
            name: crate::digest::display_name(&path),
            path,
            size_bytes,
        }
    }

    /// Label like `notes.md (1.50 KB)`
    #[must_use]
    pub fn label(&self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let kb = self.size_bytes as f64 / 1024.0;
        format!("{} ({kb:.2} KB)", self.name)
    }
}

/// Everything the surface shows, owned by the Conductor
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// The user's description of the OS
    pub prompt: String,
    /// Attached context files, in attach order
    pub files: Vec<AttachedFile>,
    /// Latest generated concept
    pub concept: Option<OsConcept>,
    /// Latest generated build script
    pub script: Option<String>,
    /// A concept request is in flight
    pub generating: bool,
    /// A script request is in flight
    pub building: bool,
    /// Message for the most recent failure
    pub error: Option<String>,
}

impl AppState {
    /// Empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any request is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.generating || self.building
    }

    /// Whether there is enough input to generate
    ///
    /// Any non-empty prompt counts, whitespace included.
    #[must_use]
    pub fn has_input(&self) -> bool {
        !self.prompt.is_empty() || !self.files.is_empty()
    }

    /// Paths of the attached files
    #[must_use]
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Begin concept generation
    ///
    /// # Errors
    ///
    /// [`StateError::Busy`] leaves the state untouched.
    /// [`StateError::Validation`] also records the validation message.
    pub fn start_generate(&mut self) -> Result<(), StateError> {
        if self.is_busy() {
            return Err(StateError::Busy);
        }
        if !self.has_input() {
            self.error = Some(StateError::Validation.to_string());
            return Err(StateError::Validation);
        }

        self.error = None;
        self.script = None;
        self.concept = None;
        self.generating = true;
        Ok(())
    }

    /// Record a generated concept
    pub fn complete_generate(&mut self, concept: OsConcept) {
        self.concept = Some(concept);
        self.generating = false;
    }

    /// Record a failed concept generation
    pub fn fail_generate(&mut self, err: &GenerationError) {
        self.error = Some(format!("Concept generation failed: {err}"));
        self.generating = false;
    }

    /// Begin script generation, returning the concept to build
    ///
    /// # Errors
    ///
    /// [`StateError::Busy`] or [`StateError::NoConcept`]; the state is left
    /// untouched in both cases.
    pub fn start_build(&mut self) -> Result<OsConcept, StateError> {
        if self.is_busy() {
            return Err(StateError::Busy);
        }
        let concept = self.concept.clone().ok_or(StateError::NoConcept)?;

        self.error = None;
        self.script = None;
        self.building = true;
        Ok(concept)
    }

    /// Record a generated script
    pub fn complete_build(&mut self, script: String) {
        self.script = Some(script);
        self.building = false;
    }

    /// Record a failed script generation
    pub fn fail_build(&mut self, err: &GenerationError) {
        self.error = Some(format!("Build script generation failed: {err}"));
        self.building = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::{parse_concept, tests::SAMPLE_CONCEPT_JSON};
    use pretty_assertions::assert_eq;

    fn concept() -> OsConcept {
        parse_concept(SAMPLE_CONCEPT_JSON).unwrap()
    }

    #[test]
    fn test_empty_input_is_rejected_with_message() {
        let mut state = AppState::new();

        assert_eq!(state.start_generate(), Err(StateError::Validation));
        assert_eq!(
            state.error.as_deref(),
            Some("Please provide a prompt or attach some files to start.")
        );
        assert!(!state.generating);
    }

    #[test]
    fn test_whitespace_prompt_is_input() {
        let mut state = AppState::new();
        state.prompt = "   \n".to_string();

        assert!(state.has_input());
        assert_eq!(state.start_generate(), Ok(()));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_files_alone_are_enough() {
        let mut state = AppState::new();
        state.files.push(AttachedFile::new("/tmp/notes.md", 10));
        assert_eq!(state.start_generate(), Ok(()));
        assert!(state.generating);
    }

    #[test]
    fn test_generate_clears_previous_results() {
        let mut state = AppState {
            prompt: "idea".to_string(),
            concept: Some(concept()),
            script: Some("echo old".to_string()),
            error: Some("old failure".to_string()),
            ..AppState::default()
        };

        state.start_generate().unwrap();

        assert!(state.concept.is_none());
        assert!(state.script.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_generate_round_trip() {
        let mut state = AppState::new();
        state.prompt = "A minimal OS for writing".to_string();
        state.start_generate().unwrap();
        state.complete_generate(concept());

        assert_eq!(state.concept, Some(concept()));
        assert!(!state.generating);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_generate_failure_message() {
        let mut state = AppState::new();
        state.prompt = "idea".to_string();
        state.start_generate().unwrap();
        state.fail_generate(&GenerationError::ConceptService("quota exceeded".to_string()));

        assert!(!state.generating);
        assert_eq!(
            state.error.as_deref(),
            Some("Concept generation failed: Failed to generate OS concept from API: quota exceeded")
        );
    }

    #[test]
    fn test_busy_rejections_leave_state_untouched() {
        let mut state = AppState::new();
        state.prompt = "idea".to_string();
        state.start_generate().unwrap();
        let snapshot = state.clone();

        assert_eq!(state.start_generate(), Err(StateError::Busy));
        assert_eq!(state.start_build(), Err(StateError::Busy));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_build_requires_concept() {
        let mut state = AppState::new();
        assert_eq!(state.start_build(), Err(StateError::NoConcept));
        assert!(!state.building);
    }

    #[test]
    fn test_build_round_trip() {
        let mut state = AppState {
            concept: Some(concept()),
            error: Some("stale".to_string()),
            ..AppState::default()
        };

        let to_build = state.start_build().unwrap();
        assert_eq!(to_build.codename, "Inkwell Dawn");
        assert!(state.building && !state.generating);
        assert!(state.error.is_none());

        state.complete_build("echo built".to_string());
        assert_eq!(state.script.as_deref(), Some("echo built"));
        assert!(!state.building);
    }

    #[test]
    fn test_build_failure_keeps_concept() {
        let mut state = AppState {
            concept: Some(concept()),
            ..AppState::default()
        };
        state.start_build().unwrap();
        state.fail_build(&GenerationError::EmptyScript);

        assert!(state.concept.is_some());
        assert!(state.script.is_none());
        assert!(state
            .error
            .as_deref()
            .unwrap()
            .starts_with("Build script generation failed: "));
    }

    #[test]
    fn test_file_label() {
        let file = AttachedFile::new("/home/me/notes.md", 1536);
        assert_eq!(file.name, "notes.md");
        assert_eq!(file.label(), "notes.md (1.50 KB)");
    }
}
