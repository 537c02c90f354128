//! Conductor Messages
//!
//! Messages sent from the Conductor to UI surfaces. Surfaces render what they
//! are told and keep no business state of their own; everything they show
//! arrives as one of these messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::concept::OsConcept;
use crate::state::AttachedFile;

/// Messages from Conductor to UI Surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorMessage {
    // ============================================
    // Results
    // ============================================
    /// A new concept is available
    ConceptReady {
        /// The generated concept
        concept: OsConcept,
    },

    /// The concept was discarded (a new generation started)
    ConceptCleared,

    /// A new build script is available
    ScriptReady {
        /// Fence-stripped script text
        script: String,
        /// Codename of the concept it builds (for export naming)
        codename: String,
    },

    /// The script was discarded
    ScriptCleared,

    /// The attached file list changed
    FilesChanged {
        /// Current attachments
        files: Vec<AttachedFile>,
    },

    /// The script was written to disk
    ArtifactSaved {
        /// Path written
        path: PathBuf,
    },

    // ============================================
    // Errors
    // ============================================
    /// A user-visible failure
    Error {
        /// Message to display
        message: String,
    },

    /// The previous error no longer applies
    ErrorCleared,

    // ============================================
    // System Messages
    // ============================================
    /// System notification
    Notify {
        /// Notification level
        level: NotifyLevel,
        /// Message content
        message: String,
    },

    /// Conductor state change
    State {
        /// The new state
        state: ConductorState,
    },

    /// Request surface to quit
    Quit {
        /// Optional goodbye message
        message: Option<String>,
    },
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
    /// Success
    Success,
}

/// Conductor operational states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorState {
    /// Starting up, not ready
    Initializing,
    /// Ready for input
    Ready,
    /// Waiting for a concept
    Generating,
    /// Waiting for a build script
    Building,
    /// Shutting down
    ShuttingDown,
}

impl ConductorState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Initializing => "Starting up...",
            Self::Ready => "Ready",
            Self::Generating => "Generating concept...",
            Self::Building => "Generating build script...",
            Self::ShuttingDown => "Shutting down...",
        }
    }

    /// Whether a request is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Generating | Self::Building)
    }
}
