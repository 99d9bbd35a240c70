//! Home Assistant voice bridge - command line entry point
//!
//! Every subcommand prints its result as pretty JSON on stdout. The process
//! exits with status 1 when the result reports `success: false`.

use clap::{Parser, Subcommand};
use ha_voice_bridge::{
    logging::{init_logging, LogConfig},
    BridgeConfig, VoiceEngine,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

/// Home Assistant voice bridge
#[derive(Parser, Debug)]
#[command(name = "ha-voice-bridge")]
#[command(about = "Resolve voice commands into Home Assistant actions using a local Ollama model")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file
    #[arg(long, global = true, env = "BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Home Assistant base URL
    #[arg(long, global = true, env = "HA_URL")]
    ha_url: Option<String>,

    /// Home Assistant long-lived access token
    #[arg(long, global = true, env = "HA_TOKEN", hide_env_values = true)]
    ha_token: Option<String>,

    /// Ollama base URL
    #[arg(long, global = true, env = "OLLAMA_URL")]
    ollama_url: Option<String>,

    /// Ollama model
    #[arg(long, global = true, env = "OLLAMA_MODEL")]
    model: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify and execute a voice command
    Command {
        /// Command text, e.g. "turn on kitchen lights"
        text: Vec<String>,
    },
    /// Resolve a camera command without classification
    Camera {
        /// Command text, e.g. "show me the driveway"
        text: Vec<String>,
    },
    /// Ask a question about the current home state
    Query {
        /// Question text, e.g. "which lights are on?"
        text: Vec<String>,
    },
    /// List addressable cameras and example commands
    Cameras,
    /// Check the state of every camera
    CameraStatus,
    /// Print example commands and queries to try
    Examples,
    /// Test connectivity to Home Assistant and Ollama
    Check,
}

impl Cli {
    /// Layer explicit flags over the loaded configuration
    fn load_config(&self) -> ha_voice_bridge::Result<BridgeConfig> {
        let mut config = BridgeConfig::load(self.config.as_deref())?;

        if let Some(url) = &self.ha_url {
            config.home_assistant.url = url.parse().map_err(|e| {
                ha_voice_bridge::BridgeError::config(format!("Invalid --ha-url: {e}"))
            })?;
        }
        if let Some(token) = &self.ha_token {
            config.home_assistant.token = token.clone();
        }
        if let Some(url) = &self.ollama_url {
            config.ollama.url = url.parse().map_err(|e| {
                ha_voice_bridge::BridgeError::config(format!("Invalid --ollama-url: {e}"))
            })?;
        }
        if let Some(model) = &self.model {
            config.ollama.model = model.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize result: {e}");
            ExitCode::FAILURE
        }
    }
}

fn exit_status(success: bool, printed: ExitCode) -> ExitCode {
    if success {
        printed
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(LogConfig::from(&config.logging).with_debug(cli.debug)) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }
    debug!(?config, "Loaded configuration");

    let engine = match VoiceEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to build engine: {e}");
            return ExitCode::FAILURE;
        }
    };

    match &cli.command {
        Command::Command { text } => {
            let result = engine.resolve_and_execute(&text.join(" ")).await;
            exit_status(result.success, print_json(&result))
        }
        Command::Camera { text } => {
            let result = engine.resolve_camera(&text.join(" ")).await;
            exit_status(result.success, print_json(&result))
        }
        Command::Query { text } => {
            let answer = engine.answer_query(&text.join(" ")).await;
            exit_status(answer.success, print_json(&answer))
        }
        Command::Cameras => print_json(&engine.list_cameras()),
        Command::Examples => print_json(&engine.example_commands()),
        Command::CameraStatus => {
            let statuses = engine.camera_status().await;
            let all_accessible = statuses.iter().all(|s| s.accessible);
            exit_status(all_accessible, print_json(&statuses))
        }
        Command::Check => {
            let report = engine.test_connections().await;
            exit_status(report.all_connected(), print_json(&report))
        }
    }
}
