//! Conductor Client
//!
//! Thin wrapper around the Conductor for surface integration.
//! This client embeds the Conductor directly (no network) and provides
//! a convenient interface for sending events and receiving messages.
//!
//! Both the full-screen TUI and the headless runner drive the Conductor
//! through this type, so neither holds any generation logic of its own.

use std::path::PathBuf;

use tokio::sync::mpsc;

use nexus_core::{
    backend, Conductor, ConductorConfig, ConductorMessage, ConductorState, LlmBackend,
    NexusConfig, SurfaceEvent, SurfaceType,
};

/// Client for communicating with the embedded Conductor
pub struct ConductorClient<B: LlmBackend + 'static = Box<dyn LlmBackend>> {
    /// The embedded Conductor instance
    conductor: Conductor<B>,
    /// Receiver for messages from Conductor
    rx: mpsc::Receiver<ConductorMessage>,
}

impl ConductorClient {
    /// Create a client whose backend is chosen by `config`
    pub fn from_config(config: &NexusConfig) -> Self {
        let backend = backend::from_config(&config.backend_config());
        Self::new(backend, config.conductor_config())
    }
}

impl<B: LlmBackend + 'static> ConductorClient<B> {
    /// Create a new client around an explicit backend
    pub fn new(backend: B, config: ConductorConfig) -> Self {
        // Create channel for Conductor -> surface messages
        let (tx, rx) = mpsc::channel(100);
        let conductor = Conductor::new(backend, config, tx);
        Self { conductor, rx }
    }

    /// Start the Conductor (health check, then Ready)
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.conductor.start().await
    }

    /// Connect this surface to the Conductor
    pub async fn connect(&mut self, surface_type: SurfaceType) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::Connected { surface_type })
            .await
    }

    /// Replace the prompt text
    pub async fn set_prompt(&mut self, text: impl Into<String>) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::PromptChanged { text: text.into() })
            .await
    }

    /// Attach context files
    pub async fn attach(&mut self, paths: Vec<PathBuf>) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::FilesAttached { paths })
            .await
    }

    /// Remove all attached files
    pub async fn clear_files(&mut self) -> anyhow::Result<()> {
        self.conductor.handle_event(SurfaceEvent::FilesCleared).await
    }

    /// Ask for a new concept
    pub async fn generate(&mut self) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::GenerateRequested)
            .await
    }

    /// Ask for a build script for the current concept
    pub async fn build(&mut self) -> anyhow::Result<()> {
        self.conductor.handle_event(SurfaceEvent::BuildRequested).await
    }

    /// Save the current script
    pub async fn export(&mut self, dir: Option<PathBuf>) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::ExportRequested { dir })
            .await
    }

    /// Notify Conductor that user wants to quit
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        self.conductor.handle_event(SurfaceEvent::QuitRequested).await
    }

    /// Apply a finished backend call (must be called regularly)
    pub async fn poll_pending(&mut self) -> bool {
        self.conductor.poll_pending().await
    }

    /// Wait for the backend call in flight, if any
    pub async fn wait_pending(&mut self) -> bool {
        self.conductor.wait_pending().await
    }

    /// Whether a backend call is in flight
    pub fn has_pending(&self) -> bool {
        self.conductor.has_pending()
    }

    /// Try to receive a message from the Conductor (non-blocking)
    pub fn try_recv(&mut self) -> Option<ConductorMessage> {
        self.rx.try_recv().ok()
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Get the current Conductor state
    pub fn state(&self) -> ConductorState {
        self.conductor.state()
    }

    /// Check if the Conductor is idle and accepting requests
    pub fn is_ready(&self) -> bool {
        matches!(self.conductor.state(), ConductorState::Ready)
    }
}
