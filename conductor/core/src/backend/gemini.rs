//! Gemini Backend Implementation
//!
//! LLM backend for Google's Gemini `generateContent` REST API.
//!
//! # Request shape
//!
//! ```text
//! POST {base}/v1beta/models/{model}:generateContent
//! x-goog-api-key: <key>
//! {
//!   "systemInstruction": { "parts": [{ "text": ... }] },
//!   "contents": [{ "role": "user", "parts": [{ "text": ... }] }],
//!   "generationConfig": {
//!     "temperature": 0.8,
//!     "responseMimeType": "application/json",
//!     "responseSchema": { "type": "OBJECT", ... }
//!   }
//! }
//! ```
//!
//! Gemini spells schema types in upper case (`OBJECT`, `STRING`, `ARRAY`), so
//! the standard JSON schema carried by [`LlmRequest`] is converted on the way
//! out.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{BackendConfig, LlmBackend, LlmRequest, LlmResponse, GEMINI_BASE_URL};

/// Gemini backend client
#[derive(Clone)]
pub struct GeminiBackend {
    /// API key, if one was configured
    api_key: Option<String>,
    /// API base URL
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        if api_key.is_none() {
            tracing::warn!("No Gemini API key set (GEMINI_API_KEY / API_KEY); requests will fail");
        }

        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
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
            BackendConfig::Gemini {
                api_key,
                base_url,
                timeout_secs,
            } => Some(Self::new(
                api_key.clone(),
                base_url.clone(),
                Duration::from_secs(*timeout_secs),
            )),
            BackendConfig::Ollama { .. } => None,
        }
    }

    /// Create from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(
            BackendConfig::api_key_from_env(),
            GEMINI_BASE_URL,
            Duration::from_secs(120),
        )
    }

    /// Endpoint for a model's `generateContent`
    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Endpoint listing models (used as a health probe)
    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.base_url)
    }

    /// Build the JSON body for `generateContent`
    fn request_body(request: &LlmRequest) -> serde_json::Value {
        let mut generation_config = serde_json::json!({
            "temperature": request.temperature,
        });

        if let Some(ref schema) = request.response_schema {
            generation_config["responseMimeType"] = serde_json::json!("application/json");
            generation_config["responseSchema"] = to_gemini_schema(schema);
        }

        let mut body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": generation_config,
        });

        if let Some(ref system) = request.system {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system }],
            });
        }

        body
    }
}

/// Convert a standard JSON schema into Gemini's dialect
///
/// Every `"type"` value is upper-cased; everything else is copied through.
#[must_use]
pub fn to_gemini_schema(schema: &serde_json::Value) -> serde_json::Value {
    match schema {
        serde_json::Value::Object(map) => {
            let converted = map
                .iter()
                .map(|(key, value)| {
                    let value = match (key.as_str(), value) {
                        ("type", serde_json::Value::String(t)) => {
                            serde_json::Value::String(t.to_uppercase())
                        }
                        _ => to_gemini_schema(value),
                    };
                    (key.clone(), value)
                })
                .collect();
            serde_json::Value::Object(converted)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(to_gemini_schema).collect())
        }
        other => other.clone(),
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn health_check(&self) -> bool {
        let Some(ref key) = self.api_key else {
            return false;
        };

        self.http_client
            .get(self.models_url())
            .header("x-goog-api-key", key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        let start = Instant::now();
        let Some(ref key) = self.api_key else {
            anyhow::bail!("API key not configured (set GEMINI_API_KEY)");
        };

        tracing::debug!(model = %request.model, json = request.wants_json(), "Sending Gemini request");

        let response = self
            .http_client
            .post(self.generate_url(&request.model))
            .header("x-goog-api-key", key)
            .json(&Self::request_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini returned {status}: {body}");
        }

        let data: GenerateContentResponse = response.json().await?;

        let Some(content) = data.text() else {
            if let Some(reason) = data.prompt_feedback.and_then(|f| f.block_reason) {
                anyhow::bail!("Gemini blocked the prompt: {reason}");
            }
            anyhow::bail!("Gemini returned no candidates");
        };

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            tokens_used: data.usage_metadata.and_then(|u| u.total_token_count),
            duration_ms: u64::try_from(start.elapsed().as_millis()).ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_url() {
        let backend = GeminiBackend::new(
            Some("k".to_string()),
            "https://example.test/",
            Duration::from_secs(5),
        );
        assert_eq!(
            backend.generate_url("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_schema_types_are_upper_cased() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "osName": { "type": "string", "description": "type of name" },
                "keyFeatures": { "type": "array", "items": { "type": "string" } },
            },
            "required": ["osName", "keyFeatures"],
        });

        let converted = to_gemini_schema(&schema);

        assert_eq!(
            converted,
            serde_json::json!({
                "type": "OBJECT",
                "properties": {
                    "osName": { "type": "STRING", "description": "type of name" },
                    "keyFeatures": { "type": "ARRAY", "items": { "type": "STRING" } },
                },
                "required": ["osName", "keyFeatures"],
            })
        );
    }

    #[test]
    fn test_request_body_structured() {
        let request = LlmRequest::new("Design an OS", "gemini-2.5-flash")
            .with_system("You are an architect")
            .with_temperature(0.8)
            .with_response_schema(serde_json::json!({"type": "object"}));

        let body = GeminiBackend::request_body(&request);

        assert_eq!(body["contents"][0]["parts"][0]["text"], "Design an OS");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are an architect"
        );
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_request_body_free_text() {
        let request = LlmRequest::new("Write a script", "gemini-2.5-flash");
        let body = GeminiBackend::request_body(&request);

        assert!(body.get("systemInstruction").is_none());
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let data: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "#!/bin/bash\n" }, { "text": "set -e" }] }
            }],
            "usageMetadata": { "totalTokenCount": 42 }
        }))
        .unwrap();

        assert_eq!(data.text().as_deref(), Some("#!/bin/bash\nset -e"));
        assert_eq!(data.usage_metadata.unwrap().total_token_count, Some(42));
    }

    #[test]
    fn test_response_without_candidates() {
        let data: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();

        assert!(data.text().is_none());
        assert_eq!(
            data.prompt_feedback.unwrap().block_reason.as_deref(),
            Some("SAFETY")
        );
    }

    #[tokio::test]
    async fn test_send_without_key_fails_fast() {
        let backend = GeminiBackend::new(None, GEMINI_BASE_URL, Duration::from_secs(1));
        let err = backend
            .send(&LlmRequest::new("hi", "gemini-2.5-flash"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("API key not configured"));
        assert!(!backend.health_check().await);
    }
}
