//! Common test utilities
//!
//! WireMock servers standing in for Home Assistant and Ollama, plus a
//! configuration pointing at them.

#![allow(dead_code)]

use ha_voice_bridge::config::BridgeConfig;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const TEST_TOKEN: &str = "test-token";

/// Mock Home Assistant REST API
pub struct MockHomeAssistantServer {
    pub server: MockServer,
}

impl MockHomeAssistantServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// `GET /api/states`
    pub async fn mock_states(&self, states: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/api/states"))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(states)))
            .mount(&self.server)
            .await;
    }

    /// `GET /api/states/{entity_id}`
    pub async fn mock_state(&self, entity_id: &str, state: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/states/{entity_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entity_id": entity_id,
                "state": state,
                "attributes": {}
            })))
            .mount(&self.server)
            .await;
    }

    /// `POST /api/services/{domain}/{service}`
    pub async fn mock_service(&self, domain: &str, service: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!("/api/services/{domain}/{service}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!([])))
            .mount(&self.server)
            .await;
    }

    /// `GET /api/camera_proxy/{entity_id}`
    pub async fn mock_camera_proxy(&self, entity_id: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/api/camera_proxy/{entity_id}")))
            .respond_with(ResponseTemplate::new(status).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .mount(&self.server)
            .await;
    }

    /// `GET /api/`
    pub async fn mock_api_root(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"message": "API running."})),
            )
            .mount(&self.server)
            .await;
    }

    /// Bodies of every service call received, in order
    pub async fn service_call_bodies(&self) -> Vec<(String, Value)> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path().starts_with("/api/services/"))
            .map(|request| {
                let body = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
                (request.url.path().to_string(), body)
            })
            .collect()
    }
}

/// Mock Ollama API
pub struct MockOllamaServer {
    pub server: MockServer,
}

impl MockOllamaServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// `POST /api/generate` answering with `reply` as the response text
    pub async fn mock_generate(&self, reply: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "dolphin-llama3:latest",
                "created_at": "2024-01-01T12:00:00Z",
                "response": reply,
                "done": true,
                "total_duration": 1_500_000_000u64,
                "eval_count": 42
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_generate_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(status).set_body_string("model not loaded"))
            .mount(&self.server)
            .await;
    }

    /// `POST /api/generate` that answers after `delay`
    pub async fn mock_generate_delayed(&self, reply: &str, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": reply, "done": true }))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// `GET /api/tags`
    pub async fn mock_tags(&self, models: &[&str]) {
        let models: Vec<Value> = models
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "modified_at": "2024-01-01T12:00:00Z",
                    "size": 4_661_224_676u64
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": models })))
            .mount(&self.server)
            .await;
    }

    /// Prompts received so far
    pub async fn prompts(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == "/api/generate")
            .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
            .filter_map(|body| body["prompt"].as_str().map(str::to_string))
            .collect()
    }
}

/// Configuration pointing at the two mock servers
pub fn test_config(ha_uri: &str, ollama_uri: &str) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.home_assistant.url = ha_uri.parse().expect("Valid URL");
    config.home_assistant.token = TEST_TOKEN.to_string();
    config.home_assistant.request_timeout = Duration::from_secs(2);
    config.home_assistant.service_timeout = Duration::from_secs(2);
    config.home_assistant.snapshot_timeout = Duration::from_secs(2);
    config.ollama.url = ollama_uri.parse().expect("Valid URL");
    config.ollama.action_timeout = Duration::from_secs(15);
    config.ollama.query_timeout = Duration::from_secs(15);
    config
}

/// A Home Assistant state record
pub fn state(entity_id: &str, state: &str, friendly_name: &str) -> Value {
    json!({
        "entity_id": entity_id,
        "state": state,
        "attributes": { "friendly_name": friendly_name },
        "last_changed": "2024-01-01T12:00:00+00:00"
    })
}
