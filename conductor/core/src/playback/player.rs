//! Playback Driver
//!
//! Runs the reveal schedule as a single tokio task per script and funnels its
//! events into a [`PlaybackEngine`].
//!
//! The task is owned by a [`PlaybackHandle`]; dropping or replacing the
//! handle aborts it. Events that were already queued when the task was
//! aborted still carry the old [`Generation`] and are discarded by the engine.

use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use super::engine::{Generation, PlaybackEngine, PlaybackEvent};
use super::timing::{schedule, INITIAL_DELAY};

/// Owns a running playback task
#[derive(Debug)]
pub struct PlaybackHandle {
    abort: AbortHandle,
    generation: Generation,
}

impl PlaybackHandle {
    /// The generation this task reveals
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Stop the task
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Whether the task has ended (completed or cancelled)
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Spawn the reveal schedule for one script
///
/// Waits [`INITIAL_DELAY`], then reveals line 0, waits `delays[0]`, reveals
/// line 1, and so on. No wait follows the last line. Must be called inside a
/// tokio runtime.
pub fn spawn_playback(
    generation: Generation,
    delays: Vec<Duration>,
    tx: mpsc::UnboundedSender<PlaybackEvent>,
) -> PlaybackHandle {
    let task = tokio::spawn(async move {
        tokio::time::sleep(INITIAL_DELAY).await;
        if tx.send(PlaybackEvent::Started { generation }).is_err() {
            return;
        }

        let last = delays.len().saturating_sub(1);
        for (index, delay) in delays.into_iter().enumerate() {
            if tx.send(PlaybackEvent::Reveal { generation, index }).is_err() {
                return;
            }
            if index < last {
                tokio::time::sleep(delay).await;
            }
        }

        tracing::debug!(%generation, "Playback schedule finished");
    });

    PlaybackHandle {
        abort: task.abort_handle(),
        generation,
    }
}

/// Engine plus its driving task
///
/// Surfaces call [`ScriptPlayer::pump`] once per frame; headless callers
/// await [`ScriptPlayer::next_change`].
#[derive(Debug)]
pub struct ScriptPlayer {
    engine: PlaybackEngine,
    handle: Option<PlaybackHandle>,
    tx: mpsc::UnboundedSender<PlaybackEvent>,
    rx: mpsc::UnboundedReceiver<PlaybackEvent>,
}

impl Default for ScriptPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptPlayer {
    /// Create an idle player
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engine: PlaybackEngine::new(),
            handle: None,
            tx,
            rx,
        }
    }

    /// Start playing `script`, replacing whatever was playing
    pub fn play(&mut self, script: &str) -> Generation {
        self.play_with_rng(script, &mut rand::thread_rng())
    }

    /// Like [`ScriptPlayer::play`] with a caller-supplied random source
    pub fn play_with_rng<R: Rng + ?Sized>(&mut self, script: &str, rng: &mut R) -> Generation {
        self.handle = None;
        let generation = self.engine.load(script);
        let delays = schedule(self.engine.lines(), rng);
        self.handle = Some(spawn_playback(generation, delays, self.tx.clone()));
        generation
    }

    /// Stop playback and clear the script
    pub fn stop(&mut self) {
        self.handle = None;
        self.engine.clear();
    }

    /// Apply every queued event without waiting
    ///
    /// Returns `true` if anything visible changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.rx.try_recv() {
            changed |= self.engine.apply(event);
        }
        changed
    }

    /// Wait for the next visible change
    ///
    /// Returns `false` once playback is complete or nothing is playing.
    pub async fn next_change(&mut self) -> bool {
        loop {
            if self.is_idle() {
                return false;
            }
            let Some(event) = self.rx.recv().await else {
                return false;
            };
            if self.engine.apply(event) {
                return true;
            }
        }
    }

    /// Whether there is nothing left to reveal
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.handle.is_none() || self.engine.is_complete()
    }

    /// The underlying engine
    #[must_use]
    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    /// Generation of the running task, if any
    #[must_use]
    pub fn active_generation(&self) -> Option<Generation> {
        self.handle.as_ref().map(PlaybackHandle::generation)
    }
}
