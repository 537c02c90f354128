//! Nexus TUI - Terminal interface for the Nexus OS generator
//!
//! This crate provides a full-screen terminal UI and a headless stdout mode,
//! both thin surfaces over the embedded `nexus_core` Conductor.
//!
//! # Architecture
//!
//! - **App**: event loop, key handling and layout
//! - **Display**: state derived from Conductor messages, plus script playback
//! - **Widgets**: concept card and simulated terminal panel
//! - **Headless**: the same flow printed to stdout with real ANSI colors

pub mod app;
pub mod conductor_client;
pub mod display;
pub mod headless;
pub mod theme;
pub mod widgets;

pub use app::{parse_input, App, InputCommand};
pub use conductor_client::ConductorClient;
pub use display::DisplayState;
pub use headless::{HeadlessOptions, HeadlessOutcome, HeadlessRunner};
