//! Ollama Backend Implementation
//!
//! LLM backend for Ollama (local LLM server). Useful for running Nexus
//! offline against a local model.
//!
//! # Ollama API
//!
//! - `/api/generate` - Generate completions
//! - `/api/tags` - List available models (used as a health probe)
//!
//! Structured output is requested through the `format` field, which accepts
//! a JSON schema directly.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::traits::{BackendConfig, LlmBackend, LlmRequest, LlmResponse};

/// Ollama backend client
#[derive(Clone)]
pub struct OllamaBackend {
    /// Host address
    host: String,
    /// Port number
    port: u16,
    /// HTTP client
    http_client: reqwest::Client,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_timeout(host, port, Duration::from_secs(120))
    }

    /// Create a new Ollama backend with a request timeout
    pub fn with_timeout(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Create from `BackendConfig`
    #[must_use]
    pub fn from_config(config: &BackendConfig) -> Option<Self> {
        match config {
            BackendConfig::Ollama {
                host,
                port,
                timeout_secs,
            } => Some(Self::with_timeout(
                host.clone(),
                *port,
                Duration::from_secs(*timeout_secs),
            )),
            BackendConfig::Gemini { .. } => None,
        }
    }

    /// Get the base URL
    fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Get generate endpoint URL
    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url())
    }

    /// Get tags endpoint URL
    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url())
    }

    /// Build the JSON body for `/api/generate`
    fn request_body(request: &LlmRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "temperature": request.temperature,
            },
        });

        if let Some(ref system) = request.system {
            body["system"] = serde_json::json!(system);
        }

        if let Some(ref schema) = request.response_schema {
            body["format"] = schema.clone();
        }

        body
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new("localhost", 11434)
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(self.tags_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }

    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        let start = Instant::now();
        let body = Self::request_body(request);

        tracing::debug!(model = %request.model, json = request.wants_json(), "Sending Ollama request");

        let response = self
            .http_client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama returned {status}: {body}");
        }

        let data: serde_json::Value = response.json().await?;

        let content = data
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("")
            .to_string();

        let tokens_used = data
            .get("eval_count")
            .and_then(serde_json::Value::as_u64)
            .and_then(|c| u32::try_from(c).ok());

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            tokens_used,
            duration_ms: u64::try_from(start.elapsed().as_millis()).ok(),
        })
    }
}
