//! Result types returned by the engine
//!
//! All of them serialize camelCase and carry an optional [`FailureReport`]
//! instead of being wrapped in `Result`.

use crate::error::{BridgeError, FailureReport};
use crate::sampling::ExecutionResult;
use crate::services::HomeContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved camera with its reachability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    pub entity_id: String,
    pub friendly_name: String,
    /// Snapshot probe answered with HTTP 200
    pub accessible: bool,
    /// Snapshot endpoint, present only when the camera is accessible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_url: Option<String>,
    /// MJPEG stream endpoint
    pub stream_url: String,
}

/// Outcome of one command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResult {
    pub success: bool,
    pub response_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_results: Option<Vec<ExecutionResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_info: Option<CameraInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureReport>,
}

impl EngineResult {
    /// A request that stopped before anything executed
    pub fn failure(error: &BridgeError) -> Self {
        Self {
            success: false,
            response_text: error.to_string(),
            execution_results: None,
            camera_info: None,
            error: Some(FailureReport::from(error)),
        }
    }
}

/// Outcome of a status question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnswer {
    pub success: bool,
    pub answer: String,
    /// Snapshot the answer was grounded on, when one was built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_used: Option<HomeContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureReport>,
}

impl QueryAnswer {
    pub fn failure(error: &BridgeError, context_used: Option<HomeContext>) -> Self {
        Self {
            success: false,
            answer: String::new(),
            context_used,
            error: Some(FailureReport::from(error)),
        }
    }
}

/// Things to try, grouped by kind, plus how to send each kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandExamples {
    pub device_commands: Vec<String>,
    pub camera_commands: Vec<String>,
    pub queries: Vec<String>,
    /// Subcommand name to a one-line description
    pub usage: BTreeMap<String, String>,
}
