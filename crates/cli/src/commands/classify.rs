//! `pagewright classify`: Dry-run classification.

use std::path::Path;
use std::process::ExitCode;

pub async fn run(config: Option<&Path>, prompt: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let agent = super::load_agent(config)?;

    match agent.classify(prompt, Vec::new()).await {
        Ok(report) => super::emit(
            &serde_json::json!({ "success": true, "classification": report }),
            true,
        ),
        Err(err) => super::emit(&super::error_envelope(&err), false),
    }
}
