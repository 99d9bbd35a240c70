//! Action plan parsing and validation
//!
//! Converts raw generative output into a typed [`ActionPlan`]. The text must be
//! a single JSON object; nothing is extracted from surrounding prose and
//! nothing is repaired. Every action is checked against the closed
//! [`ServiceDomain`] set before the plan is released, so a plan either passes
//! as a whole or is rejected before anything executes.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Domains the executor may address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceDomain {
    Light,
    Switch,
    Climate,
    MediaPlayer,
    Automation,
    Script,
}

impl ServiceDomain {
    /// Allow-list, in prompt order
    pub const ALL: [ServiceDomain; 6] = [
        ServiceDomain::Light,
        ServiceDomain::Switch,
        ServiceDomain::Climate,
        ServiceDomain::MediaPlayer,
        ServiceDomain::Automation,
        ServiceDomain::Script,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceDomain::Light => "light",
            ServiceDomain::Switch => "switch",
            ServiceDomain::Climate => "climate",
            ServiceDomain::MediaPlayer => "media_player",
            ServiceDomain::Automation => "automation",
            ServiceDomain::Script => "script",
        }
    }
}

impl fmt::Display for ServiceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceDomain {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|domain| domain.as_str() == s)
            .ok_or_else(|| BridgeError::unsupported_domain(s))
    }
}

/// A validated action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub domain: ServiceDomain,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub service_data: Map<String, Value>,
}

impl Action {
    /// Build and validate an action
    pub fn new(
        domain: &str,
        service: &str,
        entity_id: Option<&str>,
        service_data: Map<String, Value>,
    ) -> Result<Self> {
        if domain.trim().is_empty() {
            return Err(BridgeError::invalid_action("action has an empty domain"));
        }
        if service.trim().is_empty() {
            return Err(BridgeError::invalid_action(format!(
                "action for domain '{domain}' has an empty service"
            )));
        }

        let domain: ServiceDomain = domain.parse()?;

        if !is_service_name(service) {
            return Err(BridgeError::invalid_action(format!(
                "service '{service}' is not a valid service name"
            )));
        }

        Ok(Self {
            domain,
            service: service.to_string(),
            entity_id: entity_id
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            service_data,
        })
    }

    /// `domain.service`, as used in logs
    pub fn operation(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }

    /// Body sent to the platform: service data with `entity_id` merged in
    pub fn wire_body(&self) -> Map<String, Value> {
        let mut body = self.service_data.clone();
        if let Some(entity_id) = &self.entity_id {
            body.insert("entity_id".to_string(), Value::String(entity_id.clone()));
        }
        body
    }
}

/// A validated plan: actions in declared order plus explanation text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub actions: Vec<Action>,
    pub response_text: Option<String>,
}

/// Wire shape of a plan as the model writes it
///
/// `actions` is required: a reply without it carries no plan at all.
#[derive(Debug, Deserialize)]
struct RawPlan {
    actions: Vec<RawAction>,
    #[serde(
        rename = "responseText",
        alias = "response",
        alias = "response_text",
        default
    )]
    response_text: Option<String>,
}

/// Action fields stay loosely typed so that structural problems surface as
/// `InvalidAction` rather than as a parse failure.
#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(default)]
    domain: Option<Value>,
    #[serde(default)]
    service: Option<Value>,
    #[serde(alias = "entityId", default)]
    entity_id: Option<Value>,
    #[serde(alias = "serviceData", default)]
    service_data: Option<Value>,
}

/// Validator for generative action plans
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionPlanParser;

impl ActionPlanParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse and validate raw model output
    ///
    /// Parse failures carry the raw text. The first invalid action rejects the
    /// whole plan.
    pub fn parse(&self, raw: &str) -> Result<ActionPlan> {
        let value: Value = serde_json::from_str(raw.trim())
            .map_err(|e| BridgeError::malformed(e.to_string(), raw))?;

        if !value.is_object() {
            return Err(BridgeError::malformed(
                "expected a JSON object at the top level",
                raw,
            ));
        }

        let plan: RawPlan = serde_json::from_value(value)
            .map_err(|e| BridgeError::malformed(e.to_string(), raw))?;

        let mut actions = Vec::with_capacity(plan.actions.len());
        for (index, raw_action) in plan.actions.into_iter().enumerate() {
            let action = Self::validate_action(raw_action).map_err(|e| {
                warn!(index, error = %e, "Rejected action plan");
                e
            })?;
            actions.push(action);
        }

        debug!(actions = actions.len(), "Validated action plan");

        Ok(ActionPlan {
            actions,
            response_text: plan.response_text,
        })
    }

    fn validate_action(raw: RawAction) -> Result<Action> {
        let domain = text_field("domain", raw.domain)?;
        let service = text_field("service", raw.service)?;
        let entity_id = text_field("entity_id", raw.entity_id)?;

        let service_data = match raw.service_data {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(BridgeError::invalid_action(format!(
                    "service_data for {domain}.{service} must be an object, got {other}"
                )))
            }
        };

        Action::new(&domain, &service, Some(entity_id.as_str()), service_data)
    }
}

/// Missing and null read as empty; anything but a string is invalid
fn text_field(name: &str, value: Option<Value>) -> Result<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(BridgeError::invalid_action(format!(
            "{name} must be a string, got {other}"
        ))),
    }
}

fn is_service_name(service: &str) -> bool {
    !service.is_empty()
        && service
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
