//! Prompt construction and generation calls
//!
//! The domain and service vocabulary listed in the action prompt is a hint to
//! the model only. Enforcement happens in [`super::response_parser`].

use crate::error::{BridgeError, Result};
use crate::sampling::{ServiceDomain, TextGenerator};
use crate::services::HomeContext;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Services suggested to the model
const COMMON_SERVICES: &[&str] = &["turn_on", "turn_off", "toggle", "set_temperature"];

/// Build the device-control prompt for one command
pub fn build_action_prompt(command: &str) -> String {
    let domains = ServiceDomain::ALL
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are a smart home assistant. Convert this voice command to Home Assistant API calls.

Voice Command: "{command}"

Respond with ONLY a JSON object in this exact format:
{{
    "actions": [
        {{
            "domain": "light",
            "service": "turn_on",
            "entity_id": "light.living_room",
            "service_data": {{"brightness": 255}}
        }}
    ],
    "responseText": "I've turned on the living room lights to full brightness"
}}

Common domains: {domains}
Common services: {services}
Always include a friendly response message."#,
        services = COMMON_SERVICES.join(", ")
    )
}

/// Build the status-question prompt grounded on a context snapshot
pub fn build_query_prompt(context: &HomeContext, query: &str) -> Result<String> {
    let context_json = serde_json::to_string_pretty(context)?;

    Ok(format!(
        r#"Current Smart Home Status: {context_json}

User Question: "{query}"

Based on the current state of the smart home, provide a helpful answer.
Be conversational and friendly. Include specific device states when relevant."#
    ))
}

/// Drives the generative collaborator for both prompt kinds
pub struct ActionGenerator {
    generator: Arc<dyn TextGenerator>,
    action_timeout: Duration,
    query_timeout: Duration,
}

impl ActionGenerator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        action_timeout: Duration,
        query_timeout: Duration,
    ) -> Self {
        Self {
            generator,
            action_timeout,
            query_timeout,
        }
    }

    /// Ask for an action plan; the reply is returned unmodified
    #[instrument(skip(self), level = "debug")]
    pub async fn generate_plan_text(&self, command: &str) -> Result<String> {
        let prompt = build_action_prompt(command);
        let raw = self.generator.generate(&prompt, self.action_timeout).await?;
        debug!(chars = raw.len(), "Received action plan text");
        Ok(raw)
    }

    /// Ask a free-form question about the current home state
    pub async fn answer(&self, context: &HomeContext, query: &str) -> Result<String> {
        let prompt = build_query_prompt(context, query)?;
        let answer = self.generator.generate(&prompt, self.query_timeout).await?;

        if answer.trim().is_empty() {
            return Err(BridgeError::upstream("Ollama returned an empty answer"));
        }

        Ok(answer)
    }
}
