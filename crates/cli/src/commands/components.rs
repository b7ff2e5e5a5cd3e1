//! `pagewright components`: List the project's components.

use std::path::Path;
use std::process::ExitCode;

pub async fn run(config: Option<&Path>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let agent = super::load_agent(config)?;

    match agent.known_targets().await {
        Ok(components) => super::emit(
            &serde_json::json!({
                "success": true,
                "count": components.len(),
                "components": components,
            }),
            true,
        ),
        Err(err) => super::emit(&super::error_envelope(&err), false),
    }
}
