//! HTTP client implementation for the Home Assistant REST API
//!
//! Uses a long-lived bearer token and per-request deadlines taken from
//! [`HomeAssistantConfig`]. No request is retried.

use crate::client::{EntityState, HomeAssistantClient, ServiceCallResponse};
use crate::config::HomeAssistantConfig;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

/// HTTP client for Home Assistant
pub struct HomeAssistantHttpClient {
    /// HTTP client instance
    client: Client,

    /// Base URL, always ending in `/`
    base_url: Url,

    /// Deadlines
    config: HomeAssistantConfig,
}

impl HomeAssistantHttpClient {
    /// Create a new HTTP client
    pub fn new(config: HomeAssistantConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .user_agent(format!("ha-voice-bridge/{}", env!("CARGO_PKG_VERSION")));

        if config.token.is_empty() {
            warn!("No Home Assistant token configured; requests will be unauthenticated");
        } else {
            let mut default_headers = reqwest::header::HeaderMap::new();
            let header_value =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.token))
                    .map_err(|e| {
                        BridgeError::config(format!("Invalid authorization header: {e}"))
                    })?;
            default_headers.insert(reqwest::header::AUTHORIZATION, header_value);
            client_builder = client_builder.default_headers(default_headers);
        }

        let client = client_builder
            .build()
            .map_err(|e| BridgeError::config(format!("Failed to build HTTP client: {e}")))?;

        let mut base_url = config.url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Build URL for API endpoint
    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BridgeError::config(format!("Invalid URL path {path}: {e}")))
    }

    /// GET a JSON document, mapping non-success statuses to `UpstreamUnavailable`
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.build_url(path)?;
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| BridgeError::from_transport(e, "Home Assistant request failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::upstream(format!(
                "Home Assistant returned HTTP {status} for {path}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BridgeError::from_transport(e, "Invalid Home Assistant response"))
    }
}

#[async_trait]
impl HomeAssistantClient for HomeAssistantHttpClient {
    async fn get_states(&self) -> Result<Vec<EntityState>> {
        let states: Vec<EntityState> = self.get_json("api/states").await?;
        debug!("Fetched {} entity states", states.len());
        Ok(states)
    }

    async fn get_state(&self, entity_id: &str) -> Result<EntityState> {
        self.get_json(&format!("api/states/{entity_id}")).await
    }

    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        body: &Map<String, Value>,
    ) -> Result<ServiceCallResponse> {
        let url = self.build_url(&format!("api/services/{domain}/{service}"))?;
        debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .timeout(self.config.service_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| BridgeError::from_transport(e, "Service call failed"))?;

        Ok(ServiceCallResponse {
            status_code: response.status().as_u16(),
        })
    }

    async fn camera_snapshot_available(&self, entity_id: &str) -> Result<bool> {
        let url = self.build_url(&format!("api/camera_proxy/{entity_id}"))?;

        let response = self
            .client
            .get(url)
            .timeout(self.config.snapshot_timeout)
            .send()
            .await
            .map_err(|e| BridgeError::from_transport(e, "Camera snapshot probe failed"))?;

        Ok(response.status() == StatusCode::OK)
    }

    async fn health_check(&self) -> Result<u16> {
        let url = self.build_url("api/")?;

        let response = self
            .client
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| BridgeError::from_transport(e, "Home Assistant health check failed"))?;

        Ok(response.status().as_u16())
    }
}
