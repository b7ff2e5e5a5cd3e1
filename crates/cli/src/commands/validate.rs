//! `pagewright validate`: Self-healing validation of one component.

use std::path::Path;
use std::process::ExitCode;

pub async fn run(
    config: Option<&Path>,
    component: &str,
    soft: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let agent = super::load_agent(config)?;

    match agent.validate(component, soft).await {
        Ok(report) => super::emit(&serde_json::json!({ "success": true, "report": report }), true),
        Err(err) => super::emit(&super::error_envelope(&err), false),
    }
}
