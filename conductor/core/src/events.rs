//! Surface Events
//!
//! Events sent from UI surfaces to the Conductor. Surfaces report what the
//! user did; the Conductor decides what it means and answers with
//! [`crate::messages::ConductorMessage`]s.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Events from UI Surface to Conductor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    // ============================================
    // Connection Events
    // ============================================
    /// Surface connected to Conductor
    Connected {
        /// Surface type identifier
        surface_type: SurfaceType,
    },

    // ============================================
    // Input Events
    // ============================================
    /// The prompt text changed
    PromptChanged {
        /// Full prompt text
        text: String,
    },

    /// User attached files
    FilesAttached {
        /// Paths as the user typed them
        paths: Vec<PathBuf>,
    },

    /// User removed all attached files
    FilesCleared,

    // ============================================
    // Action Events
    // ============================================
    /// Generate a concept from the current prompt and files
    GenerateRequested,

    /// Generate a build script for the current concept
    BuildRequested,

    /// Save the current script
    ExportRequested {
        /// Target directory (configured default when `None`)
        dir: Option<PathBuf>,
    },

    /// User wants to quit
    QuitRequested,
}

impl SurfaceEvent {
    /// Short name for logging
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::PromptChanged { .. } => "prompt_changed",
            Self::FilesAttached { .. } => "files_attached",
            Self::FilesCleared => "files_cleared",
            Self::GenerateRequested => "generate",
            Self::BuildRequested => "build",
            Self::ExportRequested { .. } => "export",
            Self::QuitRequested => "quit",
        }
    }
}

/// Type of UI surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceType {
    /// Terminal UI (ratatui/crossterm)
    Tui,
    /// Plain stdout, no interaction
    Headless,
    /// Custom surface type
    Custom(String),
}

impl SurfaceType {
    /// Human-readable name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Tui => "Terminal",
            Self::Headless => "Headless",
            Self::Custom(name) => name,
        }
    }
}
