//! Voice intent bridge for Home Assistant
//!
//! Turns free-text commands ("turn on kitchen lights", "show me the front
//! door") into validated Home Assistant service calls or camera lookups, and
//! answers status questions from a compact snapshot of the home. A local
//! Ollama model writes the action plans; nothing it produces reaches the
//! platform without passing the plan validator.
//!
//! # Features
//!
//! - Keyword-based intent classification and ordered camera resolution
//! - Ollama-generated action plans checked against a closed domain allow-list
//! - Sequential, independent action execution with per-action results
//! - Grounded status answers from the first 50 entity states
//! - Structured, serializable failures for every request

// Core modules
pub mod camera;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod health;
pub mod intent;
pub mod logging;
pub mod sampling;
pub mod services;

// Test support modules - available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

// Re-export main types for convenience
pub use config::BridgeConfig;
pub use engine::{EngineResult, QueryAnswer, VoiceEngine};
pub use error::{BridgeError, FailureKind, FailureReport, Result};
