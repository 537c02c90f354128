//! LLM Backend Traits
//!
//! Trait definitions for LLM backends. This abstraction lets the Conductor
//! talk to Gemini, a local Ollama server, or a test double without changing
//! the orchestration logic.
//!
//! Both Nexus calls are single request/response round-trips: the concept call
//! carries a structured-output schema, the script call returns free-form text.

use async_trait::async_trait;

/// A single request to an LLM backend
#[derive(Clone, Debug)]
pub struct LlmRequest {
    /// The prompt/message to send
    pub prompt: String,
    /// Model to use (backend-specific identifier)
    pub model: String,
    /// Sampling temperature (0.0-2.0, higher = more creative)
    pub temperature: f32,
    /// System instruction (optional)
    pub system: Option<String>,
    /// JSON schema the response must conform to (optional)
    ///
    /// When set, the backend is asked for `application/json` output
    /// matching this schema. Types use standard lower-case JSON schema names.
    pub response_schema: Option<serde_json::Value>,
}

impl Default for LlmRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            model: String::new(),
            temperature: 0.7,
            system: None,
            response_schema: None,
        }
    }
}

impl LlmRequest {
    /// Create a new request with prompt and model
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Set system instruction
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Request JSON output matching `schema`
    #[must_use]
    pub fn with_response_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Whether structured JSON output was requested
    #[must_use]
    pub fn wants_json(&self) -> bool {
        self.response_schema.is_some()
    }
}

/// Response from an LLM request
#[derive(Clone, Debug)]
pub struct LlmResponse {
    /// The response text
    pub content: String,
    /// Model that generated the response
    pub model: String,
    /// Tokens used (if available)
    pub tokens_used: Option<u32>,
    /// Response generation time in milliseconds
    pub duration_ms: Option<u64>,
}

/// LLM Backend trait
///
/// Implement this trait to add support for different LLM providers.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Get the backend name (e.g., "Gemini", "Ollama")
    fn name(&self) -> &str;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Send a request and wait for the complete response
    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse>;
}

#[async_trait]
impl<T: LlmBackend + ?Sized> LlmBackend for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn health_check(&self) -> bool {
        (**self).health_check().await
    }

    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        (**self).send(request).await
    }
}

/// Backend connection configuration
#[derive(Clone, Debug)]
pub enum BackendConfig {
    /// Google Gemini `generateContent` API
    Gemini {
        /// API key (from `GEMINI_API_KEY` / `API_KEY`)
        api_key: Option<String>,
        /// API base URL
        base_url: String,
        /// Request timeout in seconds
        timeout_secs: u64,
    },
    /// Direct Ollama connection
    Ollama {
        /// Ollama host address
        host: String,
        /// Ollama port number
        port: u16,
        /// Request timeout in seconds
        timeout_secs: u64,
    },
}

/// Default Gemini API base URL
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Gemini {
            api_key: None,
            base_url: GEMINI_BASE_URL.to_string(),
            timeout_secs: 120,
        }
    }
}

impl BackendConfig {
    /// Create Ollama configuration
    pub fn ollama(host: impl Into<String>, port: u16) -> Self {
        Self::Ollama {
            host: host.into(),
            port,
            timeout_secs: 120,
        }
    }

    /// Create Gemini configuration with an API key
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::Gemini {
            api_key: Some(api_key.into()),
            base_url: GEMINI_BASE_URL.to_string(),
            timeout_secs: 120,
        }
    }

    /// Read the Gemini API key from the environment
    ///
    /// `GEMINI_API_KEY` wins over the generic `API_KEY`.
    #[must_use]
    pub fn api_key_from_env() -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_request_builder() {
        let request = LlmRequest::new("Hello", "gemini-2.5-flash")
            .with_temperature(0.4)
            .with_system("You are helpful");

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.model, "gemini-2.5-flash");
        assert!((request.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(request.system, Some("You are helpful".to_string()));
        assert!(!request.wants_json());
    }

    #[test]
    fn test_temperature_is_clamped() {
        let request = LlmRequest::new("x", "m").with_temperature(5.0);
        assert!((request.temperature - 2.0).abs() < f32::EPSILON);
        let request = LlmRequest::new("x", "m").with_temperature(-1.0);
        assert!(request.temperature.abs() < f32::EPSILON);
    }

    #[test]
    fn test_response_schema_marks_json() {
        let request =
            LlmRequest::new("x", "m").with_response_schema(serde_json::json!({"type": "object"}));
        assert!(request.wants_json());
    }

    #[test]
    fn test_backend_config_default_is_gemini() {
        match BackendConfig::default() {
            BackendConfig::Gemini {
                api_key,
                base_url,
                timeout_secs,
            } => {
                assert!(api_key.is_none());
                assert_eq!(base_url, GEMINI_BASE_URL);
                assert_eq!(timeout_secs, 120);
            }
            BackendConfig::Ollama { .. } => panic!("Expected Gemini config"),
        }
    }
}
