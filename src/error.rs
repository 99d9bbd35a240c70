//! Error types for the voice bridge
//!
//! This module provides structured error handling with machine-readable error
//! codes, recovery suggestions, and logging integration. Engine entry points
//! fold these errors into [`FailureReport`]s so that diagnostics survive to the
//! caller instead of being dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error types for bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Empty or missing command / query
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generative service or platform answered with a non-success status or
    /// could not be reached
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Collaborator call exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Generative output could not be parsed into an action plan
    #[error("Malformed response: {reason}")]
    MalformedResponse {
        /// Parser diagnostic
        reason: String,
        /// Raw text as returned by the generative service
        raw: String,
    },

    /// Action targets a domain outside the allow-list
    #[error("Unsupported domain: {0}")]
    UnsupportedDomain(String),

    /// Action is structurally unusable (empty domain/service, bad service data)
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// No camera keyword matched the command
    #[error("Entity not found: {message}")]
    EntityNotFound {
        /// Human-readable description
        message: String,
        /// Known friendly names the caller can choose from
        suggestions: Vec<String>,
    },

    /// Some of the actions in a plan failed
    #[error("Partial execution failure: {failed} of {total} actions failed")]
    PartialExecutionFailure {
        /// Number of failed actions
        failed: usize,
        /// Number of executed actions
        total: usize,
    },

    /// Every action in a plan failed
    #[error("Execution failed: all {0} actions failed")]
    ExecutionFailed(usize),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Public failure taxonomy reported to callers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InputError,
    UpstreamUnavailable,
    MalformedResponse,
    UnsupportedDomain,
    InvalidAction,
    EntityNotFound,
    PartialExecutionFailure,
    ExecutionFailed,
    Internal,
}

/// Serializable failure attached to engine results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    /// Failure class
    pub kind: FailureKind,
    /// Human-readable message
    pub message: String,
    /// Raw generative output, kept for `MalformedResponse`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
    /// Candidate camera names, kept for `EntityNotFound`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_cameras: Option<Vec<String>>,
}

impl From<&BridgeError> for FailureReport {
    fn from(error: &BridgeError) -> Self {
        let (ai_response, available_cameras) = match error {
            BridgeError::MalformedResponse { raw, .. } => (Some(raw.clone()), None),
            BridgeError::EntityNotFound { suggestions, .. } => (None, Some(suggestions.clone())),
            _ => (None, None),
        };

        Self {
            kind: error.kind(),
            message: error.to_string(),
            ai_response,
            available_cameras,
        }
    }
}

/// Structured error code for machine-readable error handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input errors (1000-1099)
    InvalidInput,

    // Upstream errors (1100-1199)
    ServiceUnavailable,
    ServiceTimeout,
    ExternalServiceError,

    // Generative output errors (1200-1299)
    MessageMalformed,
    UnsupportedDomain,
    ActionInvalid,

    // Device errors (1300-1399)
    EntityNotFound,
    DeviceControlFailed,
    PartialFailure,

    // Configuration errors (1400-1499)
    ConfigurationInvalid,

    // Internal errors (1900-1999)
    ParsingFailed,
    InternalError,
}

impl ErrorCode {
    /// Get numeric error code
    pub fn as_number(&self) -> u32 {
        match self {
            ErrorCode::InvalidInput => 1001,

            ErrorCode::ServiceUnavailable => 1101,
            ErrorCode::ServiceTimeout => 1102,
            ErrorCode::ExternalServiceError => 1103,

            ErrorCode::MessageMalformed => 1201,
            ErrorCode::UnsupportedDomain => 1202,
            ErrorCode::ActionInvalid => 1203,

            ErrorCode::EntityNotFound => 1301,
            ErrorCode::DeviceControlFailed => 1302,
            ErrorCode::PartialFailure => 1303,

            ErrorCode::ConfigurationInvalid => 1401,

            ErrorCode::ParsingFailed => 1901,
            ErrorCode::InternalError => 1902,
        }
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        match self.as_number() {
            1000..=1099 => "input",
            1100..=1199 => "upstream",
            1200..=1299 => "generation",
            1300..=1399 => "device",
            1400..=1499 => "configuration",
            1900..=1999 => "internal",
            _ => "unknown",
        }
    }
}

/// Recovery suggestion for error handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverySuggestion {
    /// Human-readable description of the suggested action
    pub description: String,
    /// Whether this action can be automated
    pub automated: bool,
    /// Command to run, if any
    pub action_code: Option<String>,
}

/// Where an error surfaced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Error code for machine processing
    pub code: ErrorCode,
    /// Component that generated the error
    pub component: String,
    /// Operation that was being performed
    pub operation: String,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Request ID for correlation
    pub correlation_id: Option<String>,
}

impl ErrorContext {
    /// Create new error context
    pub fn new(code: ErrorCode, component: &str, operation: &str) -> Self {
        Self {
            code,
            component: component.to_string(),
            operation: operation.to_string(),
            timestamp: chrono::Utc::now(),
            correlation_id: None,
        }
    }

    /// Set correlation ID for request tracking
    pub fn with_correlation_id<S: Into<String>>(mut self, id: S) -> Self {
        self.correlation_id = Some(id.into());
        self
    }
}

/// Error representation for logging and monitoring
#[derive(Debug, Clone, Serialize)]
pub struct StructuredError {
    pub code: ErrorCode,
    pub code_number: u32,
    pub category: &'static str,
    pub message: String,
    pub is_retryable: bool,
    pub component: String,
    pub operation: String,
    pub recovery_suggestions: Vec<RecoverySuggestion>,
    pub severity: ErrorSeverity,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub correlation_id: Option<String>,
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl BridgeError {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an upstream unavailable error
    pub fn upstream<S: Into<String>>(msg: S) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a malformed response error that keeps the raw text
    pub fn malformed<R: Into<String>, S: Into<String>>(reason: R, raw: S) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Create an unsupported domain error
    pub fn unsupported_domain<S: Into<String>>(domain: S) -> Self {
        Self::UnsupportedDomain(domain.into())
    }

    /// Create an invalid action error
    pub fn invalid_action<S: Into<String>>(msg: S) -> Self {
        Self::InvalidAction(msg.into())
    }

    /// Create an entity not found error with suggestions
    pub fn entity_not_found<S: Into<String>>(msg: S, suggestions: Vec<String>) -> Self {
        Self::EntityNotFound {
            message: msg.into(),
            suggestions,
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Classify a transport error from reqwest
    pub fn from_transport(err: reqwest::Error, what: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{what}: {err}"))
        } else if err.is_connect() || err.is_request() {
            Self::UpstreamUnavailable(format!("{what}: {err}"))
        } else {
            Self::Http(err)
        }
    }

    /// Fold into the caller-facing failure taxonomy
    pub fn kind(&self) -> FailureKind {
        match self {
            BridgeError::InvalidInput(_) => FailureKind::InputError,
            BridgeError::UpstreamUnavailable(_)
            | BridgeError::Timeout(_)
            | BridgeError::Http(_) => FailureKind::UpstreamUnavailable,
            BridgeError::MalformedResponse { .. } => FailureKind::MalformedResponse,
            BridgeError::UnsupportedDomain(_) => FailureKind::UnsupportedDomain,
            BridgeError::InvalidAction(_) => FailureKind::InvalidAction,
            BridgeError::EntityNotFound { .. } => FailureKind::EntityNotFound,
            BridgeError::PartialExecutionFailure { .. } => FailureKind::PartialExecutionFailure,
            BridgeError::ExecutionFailed(_) => FailureKind::ExecutionFailed,
            BridgeError::Config(_) | BridgeError::Json(_) | BridgeError::Io(_) => {
                FailureKind::Internal
            }
        }
    }

    /// Convert error to error code
    pub fn to_error_code(&self) -> ErrorCode {
        match self {
            BridgeError::InvalidInput(_) => ErrorCode::InvalidInput,
            BridgeError::UpstreamUnavailable(_) => ErrorCode::ServiceUnavailable,
            BridgeError::Timeout(_) => ErrorCode::ServiceTimeout,
            BridgeError::Http(_) => ErrorCode::ExternalServiceError,
            BridgeError::MalformedResponse { .. } => ErrorCode::MessageMalformed,
            BridgeError::UnsupportedDomain(_) => ErrorCode::UnsupportedDomain,
            BridgeError::InvalidAction(_) => ErrorCode::ActionInvalid,
            BridgeError::EntityNotFound { .. } => ErrorCode::EntityNotFound,
            BridgeError::PartialExecutionFailure { .. } => ErrorCode::PartialFailure,
            BridgeError::ExecutionFailed(_) => ErrorCode::DeviceControlFailed,
            BridgeError::Config(_) => ErrorCode::ConfigurationInvalid,
            BridgeError::Json(_) => ErrorCode::ParsingFailed,
            BridgeError::Io(_) => ErrorCode::InternalError,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BridgeError::Config(_) => ErrorSeverity::Critical,
            BridgeError::UnsupportedDomain(_) | BridgeError::ExecutionFailed(_) => {
                ErrorSeverity::Error
            }
            BridgeError::UpstreamUnavailable(_)
            | BridgeError::Timeout(_)
            | BridgeError::Http(_)
            | BridgeError::MalformedResponse { .. }
            | BridgeError::InvalidAction(_)
            | BridgeError::PartialExecutionFailure { .. } => ErrorSeverity::Warning,
            BridgeError::InvalidInput(_) | BridgeError::EntityNotFound { .. } => {
                ErrorSeverity::Info
            }
            _ => ErrorSeverity::Error,
        }
    }

    /// Generate recovery suggestions for the error
    pub fn generate_recovery_suggestions(&self) -> Vec<RecoverySuggestion> {
        match self {
            BridgeError::UpstreamUnavailable(_)
            | BridgeError::Timeout(_)
            | BridgeError::Http(_) => vec![RecoverySuggestion {
                description: "Check Home Assistant and Ollama reachability, \
                              then re-issue the command"
                    .to_string(),
                automated: true,
                action_code: Some("ha-voice-bridge check".to_string()),
            }],
            BridgeError::MalformedResponse { .. } => vec![RecoverySuggestion {
                description: "Rephrase the command or switch to a model \
                              that follows JSON instructions"
                    .to_string(),
                automated: false,
                action_code: None,
            }],
            BridgeError::EntityNotFound { .. } => vec![RecoverySuggestion {
                description: "Use one of the listed camera names".to_string(),
                automated: false,
                action_code: Some("ha-voice-bridge cameras".to_string()),
            }],
            BridgeError::Config(_) => vec![RecoverySuggestion {
                description: "Check HA_URL, HA_TOKEN and OLLAMA_URL or the configuration file"
                    .to_string(),
                automated: false,
                action_code: None,
            }],
            _ => vec![RecoverySuggestion {
                description: "Check logs for more detailed error information".to_string(),
                automated: false,
                action_code: None,
            }],
        }
    }

    /// Create a structured error from this BridgeError
    pub fn to_structured_error(&self, context: Option<ErrorContext>) -> StructuredError {
        let error_code = self.to_error_code();
        let base_context =
            context.unwrap_or_else(|| ErrorContext::new(error_code.clone(), "unknown", "unknown"));

        StructuredError {
            code: error_code.clone(),
            code_number: error_code.as_number(),
            category: error_code.category(),
            message: self.to_string(),
            is_retryable: self.is_retryable(),
            component: base_context.component,
            operation: base_context.operation,
            recovery_suggestions: self.generate_recovery_suggestions(),
            severity: self.severity(),
            timestamp: base_context.timestamp,
            correlation_id: base_context.correlation_id,
        }
    }

    /// Whether re-issuing the same command may succeed. The engine itself
    /// never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BridgeError::UpstreamUnavailable(_) | BridgeError::Timeout(_) | BridgeError::Http(_)
        )
    }
}

/// Error logging and reporting utilities
pub struct ErrorReporter;

impl ErrorReporter {
    /// Log a structured error with appropriate severity
    pub fn log_error(error: &BridgeError, context: Option<ErrorContext>) {
        let structured = error.to_structured_error(context);
        let hint = structured
            .recovery_suggestions
            .first()
            .map(|s| s.description.as_str());

        match structured.severity {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                tracing::error!(
                    error_code = structured.code_number,
                    category = structured.category,
                    component = structured.component,
                    operation = structured.operation,
                    correlation_id = structured.correlation_id,
                    hint,
                    "Error occurred: {}",
                    structured.message
                );
            }
            ErrorSeverity::Warning => {
                tracing::warn!(
                    error_code = structured.code_number,
                    category = structured.category,
                    component = structured.component,
                    operation = structured.operation,
                    correlation_id = structured.correlation_id,
                    hint,
                    "Warning: {}",
                    structured.message
                );
            }
            ErrorSeverity::Info => {
                tracing::info!(
                    error_code = structured.code_number,
                    category = structured.category,
                    component = structured.component,
                    operation = structured.operation,
                    correlation_id = structured.correlation_id,
                    hint,
                    "Info: {}",
                    structured.message
                );
            }
        }
    }
}

/// Macro for easy structured error logging
#[macro_export]
macro_rules! log_structured_error {
    ($error:expr, $component:expr, $operation:expr) => {
        $crate::error::ErrorReporter::log_error(
            &$error,
            Some($crate::error::ErrorContext::new(
                $error.to_error_code(),
                $component,
                $operation,
            )),
        )
    };
    ($error:expr, $component:expr, $operation:expr, $correlation_id:expr) => {
        $crate::error::ErrorReporter::log_error(
            &$error,
            Some(
                $crate::error::ErrorContext::new(
                    $error.to_error_code(),
                    $component,
                    $operation,
                )
                .with_correlation_id($correlation_id),
            ),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_fold_into_upstream_unavailable() {
        assert_eq!(
            BridgeError::timeout("ollama").kind(),
            FailureKind::UpstreamUnavailable
        );
        assert_eq!(
            BridgeError::upstream("ha").kind(),
            FailureKind::UpstreamUnavailable
        );
    }

    #[test]
    fn test_failure_report_keeps_raw_ai_text() {
        let error = BridgeError::malformed("expected value at line 1", "Sure! Turning it on.");
        let report = FailureReport::from(&error);

        assert_eq!(report.kind, FailureKind::MalformedResponse);
        assert_eq!(report.ai_response.as_deref(), Some("Sure! Turning it on."));
        assert!(report.available_cameras.is_none());
    }

    #[test]
    fn test_failure_report_keeps_camera_suggestions() {
        let error = BridgeError::entity_not_found(
            "no camera matches",
            vec!["Garage Camera".to_string()],
        );
        let report = FailureReport::from(&error);

        assert_eq!(report.kind, FailureKind::EntityNotFound);
        assert_eq!(
            report.available_cameras,
            Some(vec!["Garage Camera".to_string()])
        );
    }

    #[test]
    fn test_error_code_categories() {
        let error = BridgeError::unsupported_domain("rocket");
        let structured = error.to_structured_error(None);

        assert_eq!(structured.code, ErrorCode::UnsupportedDomain);
        assert_eq!(structured.code_number, 1202);
        assert_eq!(structured.category, "generation");
        assert!(!structured.is_retryable);
    }
}
