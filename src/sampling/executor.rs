//! Action execution against Home Assistant
//!
//! Actions run one after another in declared order. A failing action is
//! recorded and the next one still runs; nothing is retried or rolled back.

use super::response_parser::{Action, ActionPlan};
use crate::client::HomeAssistantClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Action that was executed
    pub action: Action,
    /// 2xx status from the platform
    pub success: bool,
    /// HTTP status, absent when the call never completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Executes validated plans
pub struct ActionExecutor {
    client: Arc<dyn HomeAssistantClient>,
}

impl ActionExecutor {
    pub fn new(client: Arc<dyn HomeAssistantClient>) -> Self {
        Self { client }
    }

    /// Execute every action of a plan, one result per action
    pub async fn execute_plan(&self, plan: &ActionPlan) -> Vec<ExecutionResult> {
        let mut results = Vec::with_capacity(plan.actions.len());

        for action in &plan.actions {
            results.push(self.execute(action).await);
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        info!(
            "Plan execution completed: {}/{} successful",
            succeeded,
            results.len()
        );

        results
    }

    /// Execute a single action
    pub async fn execute(&self, action: &Action) -> ExecutionResult {
        debug!(
            operation = %action.operation(),
            entity_id = action.entity_id.as_deref().unwrap_or(""),
            "Executing action"
        );

        let body = action.wire_body();
        match self
            .client
            .call_service(action.domain.as_str(), &action.service, &body)
            .await
        {
            Ok(response) if response.is_success() => ExecutionResult {
                action: action.clone(),
                success: true,
                status_code: Some(response.status_code),
                error: None,
            },
            Ok(response) => {
                warn!(
                    operation = %action.operation(),
                    status = response.status_code,
                    "Service call rejected"
                );
                ExecutionResult {
                    action: action.clone(),
                    success: false,
                    status_code: Some(response.status_code),
                    error: Some(format!(
                        "Home Assistant returned HTTP {}",
                        response.status_code
                    )),
                }
            }
            Err(e) => {
                warn!(operation = %action.operation(), error = %e, "Service call failed");
                ExecutionResult {
                    action: action.clone(),
                    success: false,
                    status_code: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHomeAssistantClient;
    use crate::sampling::ServiceDomain;
    use rstest::rstest;
    use serde_json::{json, Map, Value};

    fn action(domain: &str, service: &str, entity: &str) -> Action {
        Action::new(domain, service, Some(entity), Map::new()).unwrap()
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_actions() {
        let client =
            Arc::new(MockHomeAssistantClient::new().with_service_status("light.hall", 500));
        let executor = ActionExecutor::new(client.clone());
        let plan = ActionPlan {
            actions: vec![
                action("light", "turn_on", "light.hall"),
                action("light", "turn_on", "light.kitchen"),
            ],
            response_text: None,
        };

        let results = executor.execute_plan(&plan).await;

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert_eq!(results[0].status_code, Some(500));
        assert!(results[1].success);
        assert_eq!(client.service_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_has_no_status() {
        let client = Arc::new(MockHomeAssistantClient::new().unreachable());
        let executor = ActionExecutor::new(client);

        let result = executor.execute(&action("switch", "toggle", "switch.fan")).await;

        assert!(!result.success);
        assert_eq!(result.status_code, None);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_sends_merged_body_to_operation() {
        let client = Arc::new(MockHomeAssistantClient::new());
        let executor = ActionExecutor::new(client.clone());
        let mut data = Map::new();
        data.insert("brightness".to_string(), json!(128));
        let action = Action::new("light", "turn_on", Some("light.desk"), data).unwrap();

        executor.execute(&action).await;

        let calls = client.service_calls();
        assert_eq!(calls[0].domain, "light");
        assert_eq!(calls[0].service, "turn_on");
        assert_eq!(
            serde_json::Value::Object(calls[0].body.clone()),
            json!({"brightness": 128, "entity_id": "light.desk"})
        );
    }

    #[rstest]
    #[case(ServiceDomain::Light, "turn_on", "light.kitchen", json!({"brightness": 255}))]
    #[case(ServiceDomain::Switch, "toggle", "switch.coffee_maker", json!({}))]
    #[case(
        ServiceDomain::Climate,
        "set_temperature",
        "climate.living_room",
        json!({"temperature": 72})
    )]
    #[case(
        ServiceDomain::MediaPlayer,
        "volume_set",
        "media_player.tv",
        json!({"volume_level": 0.4})
    )]
    #[case(ServiceDomain::Automation, "trigger", "automation.good_night", json!({}))]
    #[case(
        ServiceDomain::Script,
        "turn_on",
        "script.movie_mode",
        json!({"variables": {"dim": true}})
    )]
    #[tokio::test]
    async fn test_every_domain_reaches_its_operation(
        #[case] domain: ServiceDomain,
        #[case] service: &str,
        #[case] entity_id: &str,
        #[case] data: Value,
    ) {
        let client = Arc::new(MockHomeAssistantClient::new());
        let executor = ActionExecutor::new(client.clone());
        let Value::Object(data) = data else {
            panic!("service data must be an object");
        };
        let action =
            Action::new(domain.as_str(), service, Some(entity_id), data.clone()).unwrap();

        let result = executor.execute(&action).await;

        assert!(result.success);
        assert_eq!(result.status_code, Some(200));
        let calls = client.service_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].domain, domain.as_str());
        assert_eq!(calls[0].service, service);
        let mut expected = data;
        expected.insert("entity_id".to_string(), json!(entity_id));
        assert_eq!(calls[0].body, expected);
    }
}
