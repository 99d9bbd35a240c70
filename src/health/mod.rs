//! Connectivity checks for both collaborators
//!
//! Probes run concurrently and never fail: every problem ends up in the
//! report.

use crate::client::HomeAssistantClient;
use crate::sampling::TextGenerator;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// Status of one collaborator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Reachable and answering normally
    Connected,
    /// Reachable but the request was refused (bad or missing token)
    AuthError,
    /// Unreachable or answering with an error
    Error,
}

/// Probe result for one collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: ConnectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
    /// Whether the configured model is among `models`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
}

impl ServiceCheck {
    fn failed(error: String, started: Instant) -> Self {
        Self {
            status: ConnectionStatus::Error,
            code: None,
            models: None,
            model_available: None,
            error: Some(error),
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Connectivity of both collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub home_assistant: ServiceCheck,
    pub ai_service: ServiceCheck,
}

impl ConnectionReport {
    pub fn all_connected(&self) -> bool {
        self.home_assistant.status == ConnectionStatus::Connected
            && self.ai_service.status == ConnectionStatus::Connected
    }
}

/// Probe the platform API root and the generative model list
pub async fn check_connections(
    home_assistant: &dyn HomeAssistantClient,
    generator: &dyn TextGenerator,
) -> ConnectionReport {
    let (home_assistant, ai_service) =
        tokio::join!(check_home_assistant(home_assistant), check_ai_service(generator));

    ConnectionReport {
        home_assistant,
        ai_service,
    }
}

async fn check_home_assistant(client: &dyn HomeAssistantClient) -> ServiceCheck {
    let started = Instant::now();

    match client.health_check().await {
        Ok(code) => {
            debug!(code, "Home Assistant probe answered");
            ServiceCheck {
                status: if code == 200 {
                    ConnectionStatus::Connected
                } else {
                    ConnectionStatus::AuthError
                },
                code: Some(code),
                models: None,
                model_available: None,
                error: None,
                latency_ms: started.elapsed().as_millis() as u64,
            }
        }
        Err(e) => ServiceCheck::failed(e.to_string(), started),
    }
}

async fn check_ai_service(generator: &dyn TextGenerator) -> ServiceCheck {
    let started = Instant::now();

    match generator.list_models().await {
        Ok(models) => {
            debug!(count = models.len(), "Ollama probe answered");
            let model_available = models.iter().any(|m| m == generator.model());
            if !model_available {
                warn!(model = generator.model(), "Configured model is not installed");
            }
            ServiceCheck {
                status: ConnectionStatus::Connected,
                code: Some(200),
                models: Some(models),
                model_available: Some(model_available),
                error: None,
                latency_ms: started.elapsed().as_millis() as u64,
            }
        }
        Err(e) => ServiceCheck::failed(e.to_string(), started),
    }
}
