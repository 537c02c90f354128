//! LLM Backend Integration
//!
//! This module provides abstracted access to LLM backends through a common
//! trait interface.
//!
//! # Available Backends
//!
//! - **Gemini**: Google's hosted API (default)
//! - **Ollama**: Local LLM server
//!
//! # Usage
//!
//! ```ignore
//! use nexus_core::backend::{GeminiBackend, LlmBackend, LlmRequest};
//!
//! let backend = GeminiBackend::from_env();
//! let request = LlmRequest::new("Hello!", "gemini-2.5-flash");
//! let response = backend.send(&request).await?;
//! ```

mod gemini;
mod ollama;
mod traits;

pub use gemini::{to_gemini_schema, GeminiBackend};
pub use ollama::OllamaBackend;
pub use traits::{BackendConfig, LlmBackend, LlmRequest, LlmResponse, GEMINI_BASE_URL};

/// Build a boxed backend from configuration
#[must_use]
pub fn from_config(config: &BackendConfig) -> Box<dyn LlmBackend> {
    match config {
        BackendConfig::Gemini { .. } => match GeminiBackend::from_config(config) {
            Some(backend) => Box::new(backend),
            None => Box::new(GeminiBackend::from_env()),
        },
        BackendConfig::Ollama { .. } => match OllamaBackend::from_config(config) {
            Some(backend) => Box::new(backend),
            None => Box::new(OllamaBackend::default()),
        },
    }
}
