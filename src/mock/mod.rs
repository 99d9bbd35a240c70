//! Mock implementations for testing
//!
//! In-memory stand-ins for Home Assistant and Ollama. Both record what they
//! were asked so tests can assert on the exact calls.

use crate::client::{EntityState, HomeAssistantClient, ServiceCallResponse};
use crate::error::{BridgeError, Result};
use crate::sampling::TextGenerator;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// A service call as received by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedServiceCall {
    pub domain: String,
    pub service: String,
    pub body: Map<String, Value>,
}

/// Mock Home Assistant client
pub struct MockHomeAssistantClient {
    states: Vec<EntityState>,
    /// Status per entity for service calls; 200 when absent
    service_status: HashMap<String, u16>,
    online_cameras: HashSet<String>,
    health_status: u16,
    unreachable: bool,
    calls: Mutex<Vec<RecordedServiceCall>>,
}

impl Default for MockHomeAssistantClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHomeAssistantClient {
    /// Create new mock client
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            service_status: HashMap::new(),
            online_cameras: HashSet::new(),
            health_status: 200,
            unreachable: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the state list
    pub fn with_states(mut self, states: Vec<EntityState>) -> Self {
        self.states = states;
        self
    }

    /// Answer service calls targeting `entity_id` with `status`
    pub fn with_service_status(mut self, entity_id: &str, status: u16) -> Self {
        self.service_status.insert(entity_id.to_string(), status);
        self
    }

    /// Make the snapshot probe succeed for a camera
    pub fn with_camera_online(mut self, entity_id: &str) -> Self {
        self.online_cameras.insert(entity_id.to_string());
        self
    }

    pub fn with_health_status(mut self, status: u16) -> Self {
        self.health_status = status;
        self
    }

    /// Fail every call as if the platform were down
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Service calls received so far, in order
    pub fn service_calls(&self) -> Vec<RecordedServiceCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            Err(BridgeError::upstream("mock Home Assistant is unreachable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl HomeAssistantClient for MockHomeAssistantClient {
    async fn get_states(&self) -> Result<Vec<EntityState>> {
        self.check_reachable()?;
        Ok(self.states.clone())
    }

    async fn get_state(&self, entity_id: &str) -> Result<EntityState> {
        self.check_reachable()?;
        self.states
            .iter()
            .find(|state| state.entity_id == entity_id)
            .cloned()
            .ok_or_else(|| {
                BridgeError::upstream(format!(
                    "Home Assistant returned HTTP 404 Not Found for api/states/{entity_id}"
                ))
            })
    }

    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        body: &Map<String, Value>,
    ) -> Result<ServiceCallResponse> {
        self.check_reachable()?;

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedServiceCall {
                domain: domain.to_string(),
                service: service.to_string(),
                body: body.clone(),
            });
        }

        let status_code = body
            .get("entity_id")
            .and_then(Value::as_str)
            .and_then(|entity_id| self.service_status.get(entity_id).copied())
            .unwrap_or(200);

        Ok(ServiceCallResponse { status_code })
    }

    async fn camera_snapshot_available(&self, entity_id: &str) -> Result<bool> {
        self.check_reachable()?;
        Ok(self.online_cameras.contains(entity_id))
    }

    async fn health_check(&self) -> Result<u16> {
        self.check_reachable()?;
        Ok(self.health_status)
    }
}

/// Mock generative text service with scripted replies
pub struct MockTextGenerator {
    replies: Mutex<VecDeque<String>>,
    model: String,
    models: Vec<String>,
    failing: bool,
    calls: Mutex<Vec<(String, Duration)>>,
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            model: "dolphin-llama3:latest".to_string(),
            models: Vec::new(),
            failing: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replies handed out in order, one per `generate` call
    pub fn with_replies(replies: Vec<String>) -> Self {
        let mock = Self::new();
        if let Ok(mut queue) = mock.replies.lock() {
            queue.extend(replies);
        }
        mock
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Fail every call as if the service were down
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Prompts received so far with their deadlines
    pub fn calls(&self) -> Vec<(String, Duration)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((prompt.to_string(), timeout));
        }

        if self.failing {
            return Err(BridgeError::upstream(
                "Ollama request failed: HTTP 503 Service Unavailable",
            ));
        }

        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .ok_or_else(|| BridgeError::upstream("mock generator has no scripted reply"))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        if self.failing {
            return Err(BridgeError::upstream("Failed to list models: HTTP 503"));
        }
        Ok(self.models.clone())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
