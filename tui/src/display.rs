//! Display State Types
//!
//! Types that represent the current display state for the surfaces.
//! These are derived from ConductorMessages and used for rendering.
//!
//! The surface is a thin client: it renders what the Conductor tells it to.
//! The one thing it drives itself is script playback, which is presentation
//! timing and lives in the [`ScriptPlayer`] owned here.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use nexus_core::{
    AttachedFile, ConductorMessage, ConductorState, NotifyLevel, OsConcept, RenderedLine,
    ScriptPlayer,
};

/// How long a notification stays on screen
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// A notification to display
#[derive(Clone, Debug)]
pub struct DisplayNotification {
    /// Notification level
    pub level: NotifyLevel,
    /// Message content
    pub message: String,
    /// When it arrived
    pub started: Instant,
    /// How long to show it
    pub duration: Duration,
}

impl DisplayNotification {
    /// Create a notification starting now
    pub fn new(level: NotifyLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            started: Instant::now(),
            duration: NOTIFICATION_TTL,
        }
    }

    /// Whether it should be removed
    pub fn is_expired(&self) -> bool {
        self.started.elapsed() >= self.duration
    }
}

/// The full display state for a surface
#[derive(Debug)]
pub struct DisplayState {
    /// Conductor state
    pub conductor_state: ConductorState,
    /// Current concept (if any)
    pub concept: Option<OsConcept>,
    /// Codename the current script was built for
    pub codename: Option<String>,
    /// Attached files
    pub files: Vec<AttachedFile>,
    /// Inline error under the prompt
    pub error: Option<String>,
    /// Transient notification
    pub notification: Option<DisplayNotification>,
    /// Where the script was last saved
    pub saved_path: Option<PathBuf>,
    /// Goodbye message from the Conductor
    pub goodbye: Option<String>,
    /// Terminal playback
    player: ScriptPlayer,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            conductor_state: ConductorState::Initializing,
            concept: None,
            codename: None,
            files: Vec::new(),
            error: None,
            notification: None,
            saved_path: None,
            goodbye: None,
            player: ScriptPlayer::new(),
        }
    }
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a ConductorMessage to update display state
    ///
    /// `ScriptReady` starts playback, so this must run inside a tokio
    /// runtime.
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            ConductorMessage::ConceptReady { concept } => {
                self.concept = Some(concept);
            }
            ConductorMessage::ConceptCleared => {
                self.concept = None;
            }
            ConductorMessage::ScriptReady { script, codename } => {
                let generation = self.player.play(&script);
                tracing::debug!(%generation, %codename, "Playing build script");
                self.codename = Some(codename);
                self.saved_path = None;
            }
            ConductorMessage::ScriptCleared => {
                self.player.stop();
                self.codename = None;
                self.saved_path = None;
            }
            ConductorMessage::FilesChanged { files } => {
                self.files = files;
            }
            ConductorMessage::ArtifactSaved { path } => {
                self.saved_path = Some(path);
            }
            ConductorMessage::Error { message } => {
                self.error = Some(message);
            }
            ConductorMessage::ErrorCleared => {
                self.error = None;
            }
            ConductorMessage::Notify { level, message } => {
                self.notification = Some(DisplayNotification::new(level, message));
            }
            ConductorMessage::State { state } => {
                self.conductor_state = state;
            }
            ConductorMessage::Quit { message } => {
                // The app will handle quitting
                self.goodbye = message;
            }
        }
    }

    /// Advance playback and expire notifications
    ///
    /// Returns `true` if a new terminal line became visible.
    pub fn update(&mut self) -> bool {
        if self
            .notification
            .as_ref()
            .is_some_and(DisplayNotification::is_expired)
        {
            self.notification = None;
        }
        self.player.pump()
    }

    /// Terminal lines revealed so far
    pub fn terminal_lines(&self) -> Vec<RenderedLine> {
        self.player.engine().rendered_lines()
    }

    /// Whether a script is loaded in the terminal
    pub fn has_script(&self) -> bool {
        self.player.engine().is_loaded()
    }

    /// Whether the terminal is still revealing lines
    pub fn is_playing(&self) -> bool {
        !self.player.is_idle()
    }

    /// The player, for surfaces that wait on it directly
    pub fn player_mut(&mut self) -> &mut ScriptPlayer {
        &mut self.player
    }

    /// Clear the notification
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }

    /// Whether Generate makes sense right now
    pub fn can_generate(&self) -> bool {
        !self.conductor_state.is_busy()
    }

    /// Whether Build makes sense right now
    pub fn can_build(&self) -> bool {
        self.concept.is_some() && !self.conductor_state.is_busy()
    }

    /// Whether Save makes sense right now
    pub fn can_export(&self) -> bool {
        self.has_script() && !self.conductor_state.is_busy()
    }
}
