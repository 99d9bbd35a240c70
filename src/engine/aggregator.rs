//! Folding pipeline outputs into [`EngineResult`]s

use super::models::{CameraInfo, EngineResult};
use crate::camera::CameraKeyword;
use crate::error::{BridgeError, FailureReport};
use crate::sampling::{ActionPlan, ExecutionResult};
use url::Url;

const DEFAULT_RESPONSE_TEXT: &str = "Command executed";

/// Combine a plan with its execution results
///
/// Success requires every action to succeed. An empty plan succeeds.
pub fn device_control(plan: ActionPlan, results: Vec<ExecutionResult>) -> EngineResult {
    let total = results.len();
    let failed = results.iter().filter(|r| !r.success).count();

    let error = match failed {
        0 => None,
        n if n == total => Some(BridgeError::ExecutionFailed(total)),
        n => Some(BridgeError::PartialExecutionFailure { failed: n, total }),
    };

    EngineResult {
        success: error.is_none(),
        response_text: plan
            .response_text
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RESPONSE_TEXT.to_string()),
        execution_results: Some(results),
        camera_info: None,
        error: error.as_ref().map(FailureReport::from),
    }
}

/// Describe a resolved camera; reachability never affects `success`
pub fn camera(entry: &CameraKeyword, accessible: bool, base_url: &Url) -> EngineResult {
    let endpoint = |path: &str| {
        base_url
            .join(&format!("{path}/{}", entry.entity_id))
            .map(|url| url.to_string())
            .unwrap_or_default()
    };

    EngineResult {
        success: true,
        response_text: format!(
            "Displaying {}. Camera is {}.",
            entry.friendly_name,
            if accessible { "online" } else { "offline" }
        ),
        execution_results: None,
        camera_info: Some(CameraInfo {
            entity_id: entry.entity_id.clone(),
            friendly_name: entry.friendly_name.clone(),
            accessible,
            snapshot_url: accessible.then(|| endpoint("api/camera_proxy")),
            stream_url: endpoint("api/camera_proxy_stream"),
        }),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::sampling::Action;
    use serde_json::Map;

    fn result(entity: &str, success: bool) -> ExecutionResult {
        ExecutionResult {
            action: Action::new("light", "turn_on", Some(entity), Map::new()).unwrap(),
            success,
            status_code: Some(if success { 200 } else { 500 }),
            error: None,
        }
    }

    fn plan(text: Option<&str>) -> ActionPlan {
        ActionPlan {
            actions: Vec::new(),
            response_text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_all_success() {
        let out = device_control(
            plan(Some("Done")),
            vec![result("light.a", true), result("light.b", true)],
        );
        assert!(out.success);
        assert_eq!(out.response_text, "Done");
        assert!(out.error.is_none());
    }

    #[test]
    fn test_one_failure_is_partial_and_keeps_order() {
        let out = device_control(
            plan(Some("Done")),
            vec![result("light.a", false), result("light.b", true)],
        );

        assert!(!out.success);
        assert_eq!(
            out.error.as_ref().map(|e| e.kind),
            Some(FailureKind::PartialExecutionFailure)
        );
        let results = out.execution_results.unwrap();
        assert_eq!(results[0].action.entity_id.as_deref(), Some("light.a"));
        assert_eq!(results[1].action.entity_id.as_deref(), Some("light.b"));
    }

    #[test]
    fn test_all_failed() {
        let out = device_control(plan(None), vec![result("light.a", false)]);
        assert!(!out.success);
        assert_eq!(out.error.map(|e| e.kind), Some(FailureKind::ExecutionFailed));
    }

    #[test]
    fn test_empty_plan_uses_default_text() {
        let out = device_control(plan(None), Vec::new());
        assert!(out.success);
        assert_eq!(out.response_text, "Command executed");
        assert_eq!(out.execution_results, Some(Vec::new()));
    }

    #[test]
    fn test_offline_camera_still_succeeds() {
        let entry = CameraKeyword::new("garage", "camera.garage", "Garage Camera");
        let base = Url::parse("http://ha.local:8123/").unwrap();

        let out = camera(&entry, false, &base);

        assert!(out.success);
        assert_eq!(out.response_text, "Displaying Garage Camera. Camera is offline.");
        let info = out.camera_info.unwrap();
        assert!(!info.accessible);
        assert!(info.snapshot_url.is_none());
        assert_eq!(
            info.stream_url,
            "http://ha.local:8123/api/camera_proxy_stream/camera.garage"
        );
    }

    #[test]
    fn test_online_camera_has_snapshot_url() {
        let entry = CameraKeyword::new("garage", "camera.garage", "Garage Camera");
        let base = Url::parse("http://ha.local:8123/").unwrap();

        let info = camera(&entry, true, &base).camera_info.unwrap();

        assert_eq!(
            info.snapshot_url.as_deref(),
            Some("http://ha.local:8123/api/camera_proxy/camera.garage")
        );
    }
}
