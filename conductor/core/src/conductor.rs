//! Conductor - The Orchestration Core
//!
//! The Conductor owns the [`AppState`] and sequences the generation pipeline:
//!
//! ```text
//! GenerateRequested ─► digest files ─► concept request ─► backend ─► OsConcept
//! BuildRequested    ─► script request ─► backend ─► fence strip ─► script
//! ExportRequested   ─► ScriptArtifact::write_to
//! ```
//!
//! It is UI-agnostic. Surfaces send [`SurfaceEvent`]s in and receive
//! [`ConductorMessage`]s out; the same Conductor drives the TUI, headless mode
//! and the tests.
//!
//! Backend calls run as spawned tokio jobs so the surface keeps rendering.
//! Surfaces call [`Conductor::poll_pending`] once per frame; headless callers
//! and tests await [`Conductor::wait_pending`] instead. Only one job can be in
//! flight at a time, which [`AppState`] enforces.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::backend::LlmBackend;
use crate::concept::{build_concept_request, parse_concept, OsConcept, CONCEPT_TEMPERATURE};
use crate::digest::digest_all;
use crate::error::{GenerationError, StateError};
use crate::events::{SurfaceEvent, SurfaceType};
use crate::export::ScriptArtifact;
use crate::messages::{ConductorMessage, ConductorState, NotifyLevel};
use crate::script::{build_script_request, parse_script, SCRIPT_TEMPERATURE};
use crate::state::{AppState, AttachedFile};

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Conductor configuration
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// Model used for both calls
    pub model: String,
    /// Sampling temperature for the concept call
    pub concept_temperature: f32,
    /// Sampling temperature for the script call
    pub script_temperature: f32,
    /// Default directory for exported scripts
    pub output_dir: PathBuf,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            concept_temperature: CONCEPT_TEMPERATURE,
            script_temperature: SCRIPT_TEMPERATURE,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Generate a concept from a prompt and attached files
///
/// All files are digested concurrently before the request is built; any read
/// failure aborts the attempt before the backend is called.
///
/// # Errors
///
/// Returns a [`GenerationError`] for digest, service or parse failures.
pub async fn generate_concept_with<L: LlmBackend + ?Sized>(
    backend: &L,
    prompt: &str,
    paths: &[PathBuf],
    model: &str,
    temperature: f32,
) -> Result<OsConcept, GenerationError> {
    let files = digest_all(paths).await?;
    let request = build_concept_request(prompt, &files, model, temperature);

    tracing::info!(
        backend = backend.name(),
        model,
        files = files.len(),
        "Requesting OS concept"
    );
    let response = backend
        .send(&request)
        .await
        .map_err(|e| GenerationError::ConceptService(format!("{e:#}")))?;

    tracing::debug!(
        tokens = ?response.tokens_used,
        duration_ms = ?response.duration_ms,
        "Concept response received"
    );
    parse_concept(&response.content)
}

/// Generate a build script for a concept
///
/// # Errors
///
/// Returns a [`GenerationError`] for service failures or an empty script.
pub async fn generate_build_script_with<L: LlmBackend + ?Sized>(
    backend: &L,
    concept: &OsConcept,
    model: &str,
    temperature: f32,
) -> Result<String, GenerationError> {
    let request = build_script_request(concept, model, temperature)
        .map_err(|e| GenerationError::ScriptService(e.to_string()))?;

    tracing::info!(
        backend = backend.name(),
        model,
        codename = %concept.codename,
        "Requesting build script"
    );
    let response = backend
        .send(&request)
        .await
        .map_err(|e| GenerationError::ScriptService(format!("{e:#}")))?;

    tracing::debug!(
        tokens = ?response.tokens_used,
        duration_ms = ?response.duration_ms,
        "Script response received"
    );
    parse_script(&response.content)
}

/// A backend call in flight
enum Job {
    Generate(JoinHandle<Result<OsConcept, GenerationError>>),
    Build(JoinHandle<Result<String, GenerationError>>),
}

impl Job {
    fn is_finished(&self) -> bool {
        match self {
            Self::Generate(handle) => handle.is_finished(),
            Self::Build(handle) => handle.is_finished(),
        }
    }

    fn abort(&self) {
        match self {
            Self::Generate(handle) => handle.abort(),
            Self::Build(handle) => handle.abort(),
        }
    }
}

/// The Conductor - headless orchestration core
pub struct Conductor<B: LlmBackend> {
    /// Configuration
    config: ConductorConfig,
    /// LLM backend, shared with spawned jobs
    backend: Arc<B>,
    /// Everything the surface displays
    app: AppState,
    /// Current operational state
    state: ConductorState,
    /// Channel to send messages to UI surface
    tx: mpsc::Sender<ConductorMessage>,
    /// Connected surface
    surface_type: Option<SurfaceType>,
    /// Backend call in flight
    job: Option<Job>,
}

impl<B: LlmBackend + 'static> Conductor<B> {
    /// Create a new Conductor with the given backend
    pub fn new(backend: B, config: ConductorConfig, tx: mpsc::Sender<ConductorMessage>) -> Self {
        Self {
            config,
            backend: Arc::new(backend),
            app: AppState::new(),
            state: ConductorState::Initializing,
            tx,
            surface_type: None,
            job: None,
        }
    }

    /// Current operational state
    pub fn state(&self) -> ConductorState {
        self.state
    }

    /// Application state
    pub fn app(&self) -> &AppState {
        &self.app
    }

    /// Configuration
    pub fn config(&self) -> &ConductorConfig {
        &self.config
    }

    /// Connected surface type, if any
    pub fn surface_type(&self) -> Option<&SurfaceType> {
        self.surface_type.as_ref()
    }

    /// Whether a backend call is in flight
    pub fn has_pending(&self) -> bool {
        self.job.is_some()
    }

    /// Start the Conductor
    ///
    /// A failed health check is reported as a warning; requests are still
    /// attempted.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.set_state(ConductorState::Initializing).await;

        if !self.backend.health_check().await {
            tracing::warn!(backend = self.backend.name(), "Backend health check failed");
            self.notify(
                NotifyLevel::Warning,
                &format!(
                    "{} backend not reachable - requests will likely fail",
                    self.backend.name()
                ),
            )
            .await;
        }

        self.set_state(ConductorState::Ready).await;
        tracing::info!(
            backend = self.backend.name(),
            model = %self.config.model,
            "Conductor ready"
        );
        Ok(())
    }

    /// Handle an event from the UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        tracing::debug!(event = event.kind(), "Handling surface event");

        match event {
            SurfaceEvent::Connected { surface_type } => {
                tracing::info!(surface = surface_type.name(), "Surface connected");
                self.surface_type = Some(surface_type);
                self.send_snapshot().await;
            }
            SurfaceEvent::PromptChanged { text } => {
                self.app.prompt = text;
            }
            SurfaceEvent::FilesAttached { paths } => {
                self.attach_files(paths).await;
            }
            SurfaceEvent::FilesCleared => {
                self.app.files.clear();
                self.send_files().await;
            }
            SurfaceEvent::GenerateRequested => self.generate().await,
            SurfaceEvent::BuildRequested => self.build().await,
            SurfaceEvent::ExportRequested { dir } => self.export(dir.as_deref()).await,
            SurfaceEvent::QuitRequested => self.shutdown().await?,
        }

        Ok(())
    }

    /// Apply a finished backend call, if any
    ///
    /// Never waits. Returns `true` if a result was applied.
    pub async fn poll_pending(&mut self) -> bool {
        if !self.job.as_ref().is_some_and(Job::is_finished) {
            return false;
        }
        self.wait_pending().await
    }

    /// Wait for the backend call in flight and apply its result
    ///
    /// Returns `false` if nothing was pending.
    pub async fn wait_pending(&mut self) -> bool {
        match self.job.take() {
            Some(Job::Generate(handle)) => {
                let result = flatten(handle.await, GenerationError::ConceptService);
                self.finish_generate(result).await;
                true
            }
            Some(Job::Build(handle)) => {
                let result = flatten(handle.await, GenerationError::ScriptService);
                self.finish_build(result).await;
                true
            }
            None => false,
        }
    }

    /// Shut down the Conductor
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        if let Some(job) = self.job.take() {
            job.abort();
        }
        self.set_state(ConductorState::ShuttingDown).await;
        self.send(ConductorMessage::Quit {
            message: Some("Goodbye!".to_string()),
        })
        .await;
        Ok(())
    }

    /// Attach files, reporting rejected paths in one notification
    ///
    /// The surface drains messages on the same task that drives the
    /// Conductor, so one event must never queue an unbounded number of them.
    async fn attach_files(&mut self, paths: Vec<PathBuf>) {
        let mut rejected = Vec::new();
        for path in paths {
            if self.app.files.iter().any(|f| f.path == path) {
                continue;
            }
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {
                    let file = AttachedFile::new(path, meta.len());
                    tracing::info!(file = %file.name, size = file.size_bytes, "Attached file");
                    self.app.files.push(file);
                }
                Ok(_) => {
                    tracing::warn!(path = %path.display(), "Not a regular file");
                    rejected.push(format!("{} is not a regular file", path.display()));
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot attach file");
                    rejected.push(format!("Cannot attach {}: {e}", path.display()));
                }
            }
        }

        if let Some(message) = rejection_summary(&rejected) {
            self.notify(NotifyLevel::Warning, &message).await;
        }
        self.send_files().await;
    }

    async fn generate(&mut self) {
        match self.app.start_generate() {
            Ok(()) => {}
            Err(StateError::Validation) => {
                self.send(ConductorMessage::Error {
                    message: StateError::Validation.to_string(),
                })
                .await;
                return;
            }
            Err(e) => {
                self.notify(NotifyLevel::Warning, &e.to_string()).await;
                return;
            }
        }

        self.send(ConductorMessage::ErrorCleared).await;
        self.send(ConductorMessage::ScriptCleared).await;
        self.send(ConductorMessage::ConceptCleared).await;
        self.set_state(ConductorState::Generating).await;

        let backend = Arc::clone(&self.backend);
        let prompt = self.app.prompt.clone();
        let paths = self.app.file_paths();
        let model = self.config.model.clone();
        let temperature = self.config.concept_temperature;

        self.job = Some(Job::Generate(tokio::spawn(async move {
            generate_concept_with(backend.as_ref(), &prompt, &paths, &model, temperature).await
        })));
    }

    async fn build(&mut self) {
        let concept = match self.app.start_build() {
            Ok(concept) => concept,
            Err(e) => {
                self.notify(NotifyLevel::Warning, &e.to_string()).await;
                return;
            }
        };

        self.send(ConductorMessage::ErrorCleared).await;
        self.send(ConductorMessage::ScriptCleared).await;
        self.set_state(ConductorState::Building).await;

        let backend = Arc::clone(&self.backend);
        let model = self.config.model.clone();
        let temperature = self.config.script_temperature;

        self.job = Some(Job::Build(tokio::spawn(async move {
            generate_build_script_with(backend.as_ref(), &concept, &model, temperature).await
        })));
    }

    async fn finish_generate(&mut self, result: Result<OsConcept, GenerationError>) {
        match result {
            Ok(concept) => {
                tracing::info!(os = %concept.os_name, codename = %concept.codename, "Concept generated");
                self.app.complete_generate(concept.clone());
                self.send(ConductorMessage::ConceptReady { concept }).await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Concept generation failed");
                self.app.fail_generate(&err);
                self.send_error().await;
            }
        }
        self.set_state(ConductorState::Ready).await;
    }

    async fn finish_build(&mut self, result: Result<String, GenerationError>) {
        match result {
            Ok(script) => {
                let codename = self
                    .app
                    .concept
                    .as_ref()
                    .map(|c| c.codename.clone())
                    .unwrap_or_default();
                tracing::info!(lines = script.lines().count(), %codename, "Build script generated");
                self.app.complete_build(script.clone());
                self.send(ConductorMessage::ScriptReady { script, codename })
                    .await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Build script generation failed");
                self.app.fail_build(&err);
                self.send_error().await;
            }
        }
        self.set_state(ConductorState::Ready).await;
    }

    async fn export(&mut self, dir: Option<&Path>) {
        let (Some(concept), Some(script)) = (&self.app.concept, &self.app.script) else {
            self.notify(NotifyLevel::Warning, "Nothing to save yet - build a script first")
                .await;
            return;
        };

        let artifact = ScriptArtifact::new(&concept.codename, script.as_str());
        let dir = dir.unwrap_or(self.config.output_dir.as_path()).to_path_buf();

        match artifact.write_to(&dir).await {
            Ok(path) => {
                self.notify(NotifyLevel::Success, &format!("Saved {}", path.display()))
                    .await;
                self.send(ConductorMessage::ArtifactSaved { path }).await;
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Export failed");
                self.notify(
                    NotifyLevel::Error,
                    &format!("Failed to save {}: {e}", artifact.file_name),
                )
                .await;
            }
        }
    }

    /// Replay current state to a newly connected surface
    async fn send_snapshot(&self) {
        self.send(ConductorMessage::State { state: self.state }).await;
        self.send_files().await;
        if let Some(ref concept) = self.app.concept {
            self.send(ConductorMessage::ConceptReady {
                concept: concept.clone(),
            })
            .await;
        }
        if let (Some(concept), Some(script)) = (&self.app.concept, &self.app.script) {
            self.send(ConductorMessage::ScriptReady {
                script: script.clone(),
                codename: concept.codename.clone(),
            })
            .await;
        }
        if self.app.error.is_some() {
            self.send_error().await;
        }
    }

    async fn send_files(&self) {
        self.send(ConductorMessage::FilesChanged {
            files: self.app.files.clone(),
        })
        .await;
    }

    async fn send_error(&self) {
        if let Some(ref message) = self.app.error {
            self.send(ConductorMessage::Error {
                message: message.clone(),
            })
            .await;
        }
    }

    /// Set state and notify UI
    async fn set_state(&mut self, state: ConductorState) {
        self.state = state;
        self.send(ConductorMessage::State { state }).await;
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(ConductorMessage::Notify {
            level,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

/// One warning line for every path an attach request skipped
fn rejection_summary(rejected: &[String]) -> Option<String> {
    match rejected {
        [] => None,
        [only] => Some(only.clone()),
        [first, rest @ ..] => Some(format!(
            "Skipped {} paths ({first}; and {} more)",
            rejected.len(),
            rest.len()
        )),
    }
}

/// Fold a panicked or cancelled job into a service error
fn flatten<T>(
    joined: Result<Result<T, GenerationError>, JoinError>,
    wrap: fn(String) -> GenerationError,
) -> Result<T, GenerationError> {
    joined.unwrap_or_else(|e| Err(wrap(e.to_string())))
}
