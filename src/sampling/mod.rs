//! Generative text pipeline
//!
//! Untrusted model output crosses a hard boundary here: [`generator`] produces
//! raw text, [`response_parser`] turns it into a validated [`ActionPlan`], and
//! only validated plans reach [`executor`].

pub mod executor;
pub mod generator;
pub mod ollama_http;
pub mod response_parser;

pub use executor::{ActionExecutor, ExecutionResult};
pub use generator::{build_action_prompt, build_query_prompt, ActionGenerator};
pub use ollama_http::OllamaHttpClient;
pub use response_parser::{Action, ActionPlan, ActionPlanParser, ServiceDomain};

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Generative text collaborator
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt and return the reply text verbatim
    ///
    /// A non-success status or a missed deadline is an error; no retry.
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String>;

    /// Names of the models the service can run
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Model the prompts are sent to
    fn model(&self) -> &str;
}
