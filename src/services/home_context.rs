//! Home context snapshot for status questions
//!
//! Buckets the first [`CONTEXT_STATE_LIMIT`] entity records by identifier
//! prefix. Sorted collections keep the serialized snapshot stable for a given
//! input.

use crate::client::EntityState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Number of state records examined per snapshot
pub const CONTEXT_STATE_LIMIT: usize = 50;

/// On/off split by friendly name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnOffSet {
    pub on: BTreeSet<String>,
    pub off: BTreeSet<String>,
}

impl OnOffSet {
    fn record(&mut self, name: &str, state: &str) {
        if state == "on" {
            self.on.insert(name.to_string());
        } else {
            self.off.insert(name.to_string());
        }
    }
}

/// Thermostat summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateSummary {
    pub current_temp: Option<Value>,
    pub target_temp: Option<Value>,
    pub mode: String,
}

/// Compact view of the home used to ground answers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeContext {
    pub lights: OnOffSet,
    pub switches: OnOffSet,
    /// Temperature sensors: friendly name to "value unit"
    pub sensors: BTreeMap<String, String>,
    pub climate: BTreeMap<String, ClimateSummary>,
}

impl HomeContext {
    /// Build a snapshot from the platform's state list
    pub fn build(states: &[EntityState]) -> Self {
        let mut context = Self::default();

        for state in states.iter().take(CONTEXT_STATE_LIMIT) {
            let name = state.friendly_name();
            let entity_id = state.entity_id.as_str();

            if entity_id.starts_with("light.") {
                context.lights.record(name, &state.state);
            } else if entity_id.starts_with("switch.") {
                context.switches.record(name, &state.state);
            } else if entity_id.starts_with("sensor.")
                && entity_id.to_lowercase().contains("temperature")
            {
                let unit = state
                    .attributes
                    .get("unit_of_measurement")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                context.sensors.insert(
                    name.to_string(),
                    format!("{} {}", state.state, unit).trim_end().to_string(),
                );
            } else if entity_id.starts_with("climate.") {
                context.climate.insert(
                    name.to_string(),
                    ClimateSummary {
                        current_temp: state.attributes.get("current_temperature").cloned(),
                        target_temp: state.attributes.get("temperature").cloned(),
                        mode: state.state.clone(),
                    },
                );
            }
        }

        context
    }

    pub fn is_empty(&self) -> bool {
        self.lights.on.is_empty()
            && self.lights.off.is_empty()
            && self.switches.on.is_empty()
            && self.switches.off.is_empty()
            && self.sensors.is_empty()
            && self.climate.is_empty()
    }
}
