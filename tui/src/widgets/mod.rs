//! Widgets
//!
//! Borderless building blocks for the Nexus screen.

pub mod concept;
pub mod scroll;
pub mod terminal;

pub use concept::{concept_lines, ConceptView};
pub use scroll::ScrollState;
pub use terminal::{to_line, TerminalView};
