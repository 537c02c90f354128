//! Playback State Machine
//!
//! [`PlaybackEngine`] owns the loaded script and how much of it has been
//! revealed. It never sleeps and never spawns; a driver (see
//! [`super::player`]) feeds it [`PlaybackEvent`]s.
//!
//! Every load bumps the [`Generation`]. Events carry the generation they were
//! scheduled for, and events from an older generation are dropped, so a
//! reset can never be followed by a line from the previous script.

use serde::{Deserialize, Serialize};

use super::render::{render_line, RenderedLine};

/// Identifies one loaded script
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// The generation after this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Playback lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Loaded (or empty) and waiting for the initial delay
    #[default]
    Idle,
    /// Revealing lines
    Playing,
    /// Every line has been revealed
    Complete,
}

/// Scheduler output consumed by the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The initial delay elapsed
    Started {
        /// Script this event belongs to
        generation: Generation,
    },
    /// Line `index` is due
    Reveal {
        /// Script this event belongs to
        generation: Generation,
        /// Zero-based line index
        index: usize,
    },
}

impl PlaybackEvent {
    /// The generation this event was scheduled for
    #[must_use]
    pub fn generation(&self) -> Generation {
        match self {
            Self::Started { generation } | Self::Reveal { generation, .. } => *generation,
        }
    }
}

/// Incremental reveal of a script's lines
#[derive(Clone, Debug, Default)]
pub struct PlaybackEngine {
    script: String,
    lines: Vec<String>,
    revealed: usize,
    state: PlaybackState,
    generation: Generation,
}

impl PlaybackEngine {
    /// Create an empty engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a script, discarding any previous playback
    ///
    /// The script is split on `\n` only; lines are not trimmed.
    pub fn load(&mut self, script: &str) -> Generation {
        self.generation = self.generation.next();
        self.script = script.to_string();
        self.lines = script.split('\n').map(str::to_string).collect();
        self.revealed = 0;
        self.state = PlaybackState::Idle;

        tracing::debug!(
            generation = %self.generation,
            lines = self.lines.len(),
            "Loaded script for playback"
        );
        self.generation
    }

    /// Drop the current script
    pub fn clear(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.script.clear();
        self.lines.clear();
        self.revealed = 0;
        self.state = PlaybackState::Idle;
        self.generation
    }

    /// Apply a scheduler event
    ///
    /// Returns `true` if the visible output or state changed. Stale or
    /// out-of-order events are ignored.
    pub fn apply(&mut self, event: PlaybackEvent) -> bool {
        if event.generation() != self.generation {
            tracing::trace!(
                stale = %event.generation(),
                current = %self.generation,
                "Ignoring stale playback event"
            );
            return false;
        }

        match event {
            PlaybackEvent::Started { .. } => {
                if self.state != PlaybackState::Idle {
                    return false;
                }
                self.state = if self.lines.is_empty() {
                    PlaybackState::Complete
                } else {
                    PlaybackState::Playing
                };
                true
            }
            PlaybackEvent::Reveal { index, .. } => {
                if index != self.revealed || index >= self.lines.len() {
                    return false;
                }
                self.revealed += 1;
                self.state = if self.revealed == self.lines.len() {
                    PlaybackState::Complete
                } else {
                    PlaybackState::Playing
                };
                true
            }
        }
    }

    /// The script as loaded
    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Every line of the loaded script
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines revealed so far, verbatim
    #[must_use]
    pub fn revealed_lines(&self) -> &[String] {
        &self.lines[..self.revealed]
    }

    /// Revealed lines after suppression and styling
    #[must_use]
    pub fn rendered_lines(&self) -> Vec<RenderedLine> {
        self.revealed_lines()
            .iter()
            .filter_map(|line| render_line(line))
            .collect()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current generation
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether a script is loaded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.lines.is_empty()
    }

    /// Whether every line has been revealed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == PlaybackState::Complete
    }
}
