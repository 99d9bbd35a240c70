//! Services built on top of the platform client

pub mod home_context;

pub use home_context::{ClimateSummary, HomeContext, OnOffSet, CONTEXT_STATE_LIMIT};
