//! Nexus Core - Headless Orchestration for the Nexus OS Generator
//!
//! A user describes an operating system in plain language (optionally with
//! context files). An AI service turns that into a structured [`OsConcept`],
//! a second call produces a shell script that notionally builds it, and the
//! script is replayed as a simulated terminal session. Nothing is ever built,
//! compiled or executed.
//!
//! This crate holds all of the logic and none of the UI. It can drive a TUI,
//! a headless stdout surface, or a test harness.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                          │
//! │        ┌───────────┐                 ┌──────────────┐       │
//! │        │    TUI    │                 │   Headless   │       │
//! │        │ (ratatui) │                 │   (stdout)   │       │
//! │        └─────┬─────┘                 └──────┬───────┘       │
//! │              └──────────────┬───────────────┘               │
//! │                    SurfaceEvent (up)                        │
//! │                  ConductorMessage (down)                    │
//! └─────────────────────────────┼───────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┼───────────────────────────────┐
//! │                        NEXUS CORE                           │
//! │  ┌──────────────────────────┴────────────────────────────┐  │
//! │  │                      Conductor                        │  │
//! │  │  ┌────────┐  ┌─────────┐  ┌────────┐  ┌────────────┐  │  │
//! │  │  │ digest │  │ concept │  │ script │  │  Backend   │  │  │
//! │  │  └────────┘  └─────────┘  └────────┘  │   (LLM)    │  │  │
//! │  │              AppState                 └────────────┘  │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! │                 playback (driven by the surface)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use nexus_core::{backend, Conductor, NexusConfig, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! let config = nexus_core::load_config()?;
//! let (tx, mut rx) = mpsc::channel(100);
//! let mut conductor = Conductor::new(
//!     backend::from_config(&config.backend_config()),
//!     config.conductor_config(),
//!     tx,
//! );
//! conductor.start().await?;
//!
//! conductor.handle_event(SurfaceEvent::PromptChanged { text: "An OS for astronomers".into() }).await?;
//! conductor.handle_event(SurfaceEvent::GenerateRequested).await?;
//! conductor.wait_pending().await;
//!
//! while let Ok(msg) = rx.try_recv() {
//!     // Render message to UI
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`digest`]: bounded text snippets from attached files
//! - [`concept`]: concept request, schema and response parsing
//! - [`script`]: build-script request and fence stripping
//! - [`playback`]: timed, styled replay of a script
//! - [`state`]: application state with explicit transitions
//! - [`conductor`]: async orchestration over an [`LlmBackend`]
//! - [`backend`]: LLM backends (Gemini, Ollama)
//! - [`export`]: downloadable script artifact
//! - [`config`]: TOML, environment and CLI configuration
//! - [`events`]: Events from UI surfaces to Conductor
//! - [`messages`]: Messages from Conductor to UI surfaces
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod concept;
pub mod conductor;
pub mod config;
pub mod digest;
pub mod error;
pub mod events;
pub mod export;
pub mod messages;
pub mod playback;
pub mod script;
pub mod state;

// Re-exports for convenience
pub use backend::{BackendConfig, GeminiBackend, LlmBackend, LlmRequest, LlmResponse, OllamaBackend};
pub use concept::OsConcept;
pub use conductor::{
    generate_build_script_with, generate_concept_with, Conductor, ConductorConfig,
};
pub use digest::FileSnippet;
pub use error::{GenerationError, StateError};
pub use events::{SurfaceEvent, SurfaceType};
pub use export::{script_file_name, ScriptArtifact};
pub use messages::{ConductorMessage, ConductorState, NotifyLevel};
pub use playback::{LineStyle, PlaybackState, RenderedLine, ScriptPlayer};
pub use state::{AppState, AttachedFile};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, NexusConfig, NexusToml, Provider,
};
