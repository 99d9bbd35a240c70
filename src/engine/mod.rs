//! Voice intent engine
//!
//! [`VoiceEngine`] is the single entry point. Each call runs in its own
//! tracing span tagged with a fresh `request_id`, follows a strictly
//! sequential pipeline, and returns a result value even when something fails.

pub mod aggregator;
pub mod models;

pub use models::{CameraInfo, CommandExamples, EngineResult, QueryAnswer};

use crate::camera::{self, CameraCatalog, CameraKeyword, CameraMapping, CameraStatus};
use crate::client::{HomeAssistantClient, HomeAssistantHttpClient};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::health::{self, ConnectionReport};
use crate::intent::{self, Intent};
use crate::log_structured_error;
use crate::sampling::{
    ActionExecutor, ActionGenerator, ActionPlanParser, OllamaHttpClient, TextGenerator,
};
use crate::services::HomeContext;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

/// Device-control commands the action planner handles well
pub const DEVICE_EXAMPLE_COMMANDS: &[&str] = &[
    "Turn on the living room lights",
    "Set temperature to 72 degrees",
    "Turn off all lights",
    "Turn on movie mode",
    "Good night - secure the house",
];

/// Status questions answered from the home snapshot
pub const QUERY_EXAMPLES: &[&str] = &[
    "What's the temperature in the house?",
    "Is everything secure?",
    "Which lights are on?",
];

/// Deadlines and addresses the engine needs beyond its collaborators
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Home Assistant base URL, used to build camera links
    pub home_assistant_url: Url,
    pub action_timeout: Duration,
    pub query_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let config = BridgeConfig::default();
        Self::from(&config)
    }
}

impl From<&BridgeConfig> for EngineSettings {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            home_assistant_url: config.home_assistant.url.clone(),
            action_timeout: config.ollama.action_timeout,
            query_timeout: config.ollama.query_timeout,
        }
    }
}

/// Resolves commands into actions and answers status questions
pub struct VoiceEngine {
    client: Arc<dyn HomeAssistantClient>,
    text_generator: Arc<dyn TextGenerator>,
    cameras: CameraMapping,
    generator: ActionGenerator,
    parser: ActionPlanParser,
    executor: ActionExecutor,
    base_url: Url,
}

impl VoiceEngine {
    pub fn new(
        client: Arc<dyn HomeAssistantClient>,
        text_generator: Arc<dyn TextGenerator>,
        cameras: CameraMapping,
        settings: EngineSettings,
    ) -> Self {
        let mut base_url = settings.home_assistant_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            generator: ActionGenerator::new(
                text_generator.clone(),
                settings.action_timeout,
                settings.query_timeout,
            ),
            executor: ActionExecutor::new(client.clone()),
            parser: ActionPlanParser::new(),
            client,
            text_generator,
            cameras,
            base_url,
        }
    }

    /// Build an engine with HTTP collaborators
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let client = HomeAssistantHttpClient::new(config.home_assistant.clone())?;
        let text_generator = OllamaHttpClient::new(&config.ollama)?;

        Ok(Self::new(
            Arc::new(client),
            Arc::new(text_generator),
            config.camera_mapping()?,
            EngineSettings::from(config),
        ))
    }

    /// Classify a command and run the matching pipeline
    pub async fn resolve_and_execute(&self, command: &str) -> EngineResult {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("resolve_and_execute", request_id = %request_id);

        async {
            let command = match non_empty(command, "command") {
                Ok(command) => command,
                Err(e) => return self.fail(e, "resolve_and_execute", &request_id),
            };

            let intent = intent::classify(command);
            info!(?intent, "Handling command");

            match intent {
                Intent::CameraQuery => self.camera_pipeline(command, &request_id).await,
                Intent::DeviceControl => match self.device_pipeline(command).await {
                    Ok(result) => {
                        if let Some(error) = &result.error {
                            warn!(kind = ?error.kind, "{}", error.message);
                        }
                        result
                    }
                    Err(e) => self.fail(e, "resolve_and_execute", &request_id),
                },
            }
        }
        .instrument(span)
        .await
    }

    /// Run the camera pipeline without classifying the command first
    pub async fn resolve_camera(&self, command: &str) -> EngineResult {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("resolve_camera", request_id = %request_id);

        async {
            match non_empty(command, "command") {
                Ok(command) => self.camera_pipeline(command, &request_id).await,
                Err(e) => self.fail(e, "resolve_camera", &request_id),
            }
        }
        .instrument(span)
        .await
    }

    /// Answer a free-form question from the current home state
    pub async fn answer_query(&self, query: &str) -> QueryAnswer {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("answer_query", request_id = %request_id);

        async {
            let query = match non_empty(query, "query") {
                Ok(query) => query,
                Err(e) => {
                    log_structured_error!(e, "engine", "answer_query", request_id.as_str());
                    return QueryAnswer::failure(&e, None);
                }
            };

            let context = match self.client.get_states().await {
                Ok(states) => HomeContext::build(&states),
                Err(e) => {
                    log_structured_error!(e, "engine", "answer_query", request_id.as_str());
                    return QueryAnswer::failure(&e, None);
                }
            };
            debug!("Built home context");

            match self.generator.answer(&context, query).await {
                Ok(answer) => QueryAnswer {
                    success: true,
                    answer,
                    context_used: Some(context),
                    error: None,
                },
                Err(e) => {
                    log_structured_error!(e, "engine", "answer_query", request_id.as_str());
                    QueryAnswer::failure(&e, Some(context))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Addressable cameras, keywords and example commands
    pub fn list_cameras(&self) -> CameraCatalog {
        self.cameras.catalog()
    }

    /// Example commands and queries with the subcommand that sends each
    pub fn example_commands(&self) -> CommandExamples {
        let to_strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        let usage = [
            ("command", "ha-voice-bridge command <text>: classify and execute a command"),
            ("camera", "ha-voice-bridge camera <text>: show a camera"),
            ("query", "ha-voice-bridge query <text>: ask about the current home state"),
        ]
        .into_iter()
        .map(|(name, text)| (name.to_string(), text.to_string()))
        .collect();

        CommandExamples {
            device_commands: to_strings(DEVICE_EXAMPLE_COMMANDS),
            camera_commands: to_strings(camera::EXAMPLE_COMMANDS),
            queries: to_strings(QUERY_EXAMPLES),
            usage,
        }
    }

    /// State of every distinct camera; failures are recorded per camera
    pub async fn camera_status(&self) -> Vec<CameraStatus> {
        let mut statuses = Vec::new();

        for camera in self.cameras.cameras() {
            let status = match self.client.get_state(&camera.entity_id).await {
                Ok(state) => CameraStatus {
                    entity_id: camera.entity_id,
                    friendly_name: camera.friendly_name,
                    state: Some(state.state),
                    accessible: true,
                    error: None,
                },
                Err(e) => {
                    debug!(entity_id = %camera.entity_id, error = %e, "Camera state unavailable");
                    CameraStatus {
                        entity_id: camera.entity_id,
                        friendly_name: camera.friendly_name,
                        state: None,
                        accessible: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            statuses.push(status);
        }

        statuses
    }

    /// Probe both collaborators
    pub async fn test_connections(&self) -> ConnectionReport {
        health::check_connections(self.client.as_ref(), self.text_generator.as_ref()).await
    }

    async fn device_pipeline(&self, command: &str) -> Result<EngineResult> {
        let raw = self.generator.generate_plan_text(command).await?;
        let plan = self.parser.parse(&raw)?;
        info!(actions = plan.actions.len(), "Executing action plan");

        let results = self.executor.execute_plan(&plan).await;
        Ok(aggregator::device_control(plan, results))
    }

    async fn camera_pipeline(&self, command: &str, request_id: &str) -> EngineResult {
        let entry: &CameraKeyword = match self.cameras.resolve(command) {
            Ok(entry) => entry,
            Err(e) => return self.fail(e, "resolve_camera", request_id),
        };

        let accessible = match self.client.camera_snapshot_available(&entry.entity_id).await {
            Ok(accessible) => accessible,
            Err(e) => {
                debug!(entity_id = %entry.entity_id, error = %e, "Snapshot probe failed");
                false
            }
        };

        info!(entity_id = %entry.entity_id, accessible, "Resolved camera");
        aggregator::camera(entry, accessible, &self.base_url)
    }

    fn fail(&self, error: BridgeError, operation: &str, request_id: &str) -> EngineResult {
        log_structured_error!(error, "engine", operation, request_id);
        EngineResult::failure(&error)
    }
}

fn non_empty<'a>(input: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(BridgeError::invalid_input(format!("No {what} provided")))
    } else {
        Ok(trimmed)
    }
}
