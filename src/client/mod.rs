//! Home Assistant client abstraction
//!
//! The engine talks to the platform only through [`HomeAssistantClient`]; the
//! HTTP implementation lives in [`http_client`].

pub mod http_client;

pub use http_client::HomeAssistantHttpClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entity record as returned by `GET /api/states`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Entity identifier (e.g., "light.kitchen")
    pub entity_id: String,
    /// Current state string (e.g., "on", "22.5", "heat")
    #[serde(default)]
    pub state: String,
    /// Free-form attributes
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    pub fn new(entity_id: &str, state: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            state: state.to_string(),
            attributes: Map::new(),
        }
    }

    /// Attach an attribute
    pub fn with_attribute<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// `friendly_name` attribute, falling back to the entity identifier
    pub fn friendly_name(&self) -> &str {
        self.attributes
            .get("friendly_name")
            .and_then(Value::as_str)
            .unwrap_or(&self.entity_id)
    }
}

/// Outcome of a service call; the platform guarantees only a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCallResponse {
    pub status_code: u16,
}

impl ServiceCallResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Trait for smart-home platform implementations
#[async_trait]
pub trait HomeAssistantClient: Send + Sync {
    /// Fetch every entity state
    async fn get_states(&self) -> Result<Vec<EntityState>>;

    /// Fetch one entity state
    async fn get_state(&self, entity_id: &str) -> Result<EntityState>;

    /// Invoke `{domain}/{service}` with the given body
    ///
    /// A non-success status is returned as a response, not an error; `Err` is
    /// reserved for transport failures and timeouts.
    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        body: &Map<String, Value>,
    ) -> Result<ServiceCallResponse>;

    /// Whether the camera snapshot endpoint answers for this entity
    async fn camera_snapshot_available(&self, entity_id: &str) -> Result<bool>;

    /// Probe the API root; returns the HTTP status code
    async fn health_check(&self) -> Result<u16>;
}
