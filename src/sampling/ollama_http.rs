//! Ollama HTTP client
//!
//! Talks to `POST /api/generate` with streaming disabled and lists models
//! through `GET /api/tags`.

use crate::config::OllamaConfig;
use crate::error::{BridgeError, Result};
use crate::sampling::TextGenerator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Ollama API generate request
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Ollama API response
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    total_duration: u64,
    #[serde(default)]
    eval_count: u32,
}

/// Ollama model info
#[derive(Debug, Deserialize)]
struct OllamaModelInfo {
    name: String,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct OllamaModelsResponse {
    #[serde(default)]
    models: Vec<OllamaModelInfo>,
}

/// Ollama HTTP client
pub struct OllamaHttpClient {
    base_url: Url,
    model: String,
    client: reqwest::Client,
    /// Deadline for the model list probe
    probe_timeout: Duration,
}

impl OllamaHttpClient {
    /// Create a new Ollama HTTP client
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("ha-voice-bridge/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::config(format!("Failed to create HTTP client: {}", e)))?;

        let mut base_url = config.url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            model: config.model.clone(),
            client,
            probe_timeout: Duration::from_secs(5),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BridgeError::config(format!("Invalid Ollama URL path {path}: {e}")))
    }
}

#[async_trait]
impl TextGenerator for OllamaHttpClient {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String> {
        let url = self.endpoint("api/generate")?;
        let request = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        info!(model = %self.model, "Sending prompt to Ollama");

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| BridgeError::from_transport(e, "Ollama request failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BridgeError::upstream(format!(
                "Ollama request failed: HTTP {} - {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::from_transport(e, "Ollama response body"))?;
        let reply: OllamaGenerateResponse = serde_json::from_str(&body).map_err(|e| {
            BridgeError::upstream(format!("Ollama reply has no usable response field: {e}"))
        })?;

        debug!(
            "Received Ollama response ({}ms total, {} tokens)",
            reply.total_duration / 1_000_000,
            reply.eval_count
        );

        Ok(reply.response)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = self.endpoint("api/tags")?;

        let response = self
            .client
            .get(url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| BridgeError::from_transport(e, "Failed to list models"))?;

        if !response.status().is_success() {
            return Err(BridgeError::upstream(format!(
                "Failed to list models: HTTP {}",
                response.status()
            )));
        }

        let models_response: OllamaModelsResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::upstream(format!("Failed to parse models response: {}", e)))?;

        Ok(models_response.models.into_iter().map(|m| m.name).collect())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_disables_streaming() {
        let request = OllamaGenerateRequest {
            model: "dolphin-llama3:latest",
            prompt: "hi",
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "model": "dolphin-llama3:latest", "prompt": "hi", "stream": false })
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let mut config = OllamaConfig::default();
        config.url = Url::parse("http://gpu-box:11434/ollama").unwrap();
        let client = OllamaHttpClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("api/tags").unwrap().as_str(),
            "http://gpu-box:11434/ollama/api/tags"
        );
    }

    #[tokio::test]
    #[ignore = "Requires local Ollama instance"]
    async fn test_ollama_list_models() {
        let client = OllamaHttpClient::new(&OllamaConfig::default()).unwrap();
        let models = client.list_models().await.unwrap();
        assert!(!models.is_empty(), "Should have at least one model");
    }
}
