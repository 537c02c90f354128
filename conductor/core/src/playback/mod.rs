//! Terminal Playback
//!
//! Replays a build script as a simulated terminal session. Nothing is
//! executed: lines are revealed one at a time with synthetic pacing and
//! rendered with a small set of styling rules.
//!
//! # Layers
//!
//! - [`ansi`]: escape-sequence to styled-segment translation (pure)
//! - [`render`]: suppression, comment and alert rules (pure)
//! - [`timing`]: per-line delays
//! - [`engine`]: the `Idle → Playing → Complete` state machine
//! - [`player`]: a cancellable tokio task driving the engine
//!
//! ```text
//!   load(script) ──► Idle ──500ms──► Playing ──last line──► Complete
//!        ▲                              │
//!        └────────── load(new) ─────────┘   (old generation ignored)
//! ```
//!
//! Revealed lines are stored verbatim; styling is applied at render time so
//! the exported script and the playback always come from the same text.

pub mod ansi;
pub mod engine;
pub mod player;
pub mod render;
pub mod timing;

pub use ansi::{translate, AnsiColor, Segment};
pub use engine::{Generation, PlaybackEngine, PlaybackEvent, PlaybackState};
pub use player::{spawn_playback, PlaybackHandle, ScriptPlayer};
pub use render::{is_suppressed, line_style, render_line, LineStyle, RenderedLine, PROMPT_GLYPH};
pub use timing::{line_delay, schedule, sleep_delay, typing_delay, INITIAL_DELAY};
