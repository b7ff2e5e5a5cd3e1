pub mod batch;
pub mod classify;
pub mod components;
pub mod doctor;
pub mod edit;
pub mod init;
pub mod serve;
pub mod validate;

use pagewright_agent::PageAgent;
use pagewright_config::AppConfig;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

/// Load the explicit config file if one was given, the default lookup otherwise.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    debug!(explicit = path.is_some(), "Configuration loaded");
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}

pub fn load_agent(path: Option<&Path>) -> Result<PageAgent, Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    Ok(PageAgent::from_config(&config)?)
}

/// Pretty-print an envelope and map its `success` flag to the exit code.
pub fn emit<T: Serialize>(envelope: &T, success: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(exit_code(success))
}

pub fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

pub fn error_envelope(err: &pagewright_core::AgentError) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": err.to_string(),
        "errorKind": err.kind(),
        "suggestions": err.suggestions(),
    })
}
