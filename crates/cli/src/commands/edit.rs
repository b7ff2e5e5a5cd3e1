//! `pagewright edit`: Apply a free-text instruction.

use pagewright_core::EditRequest;
use std::path::Path;
use std::process::ExitCode;

pub async fn run(
    config: Option<&Path>,
    prompt: String,
    disambiguation: Option<String>,
    image: Option<String>,
    layout: Option<String>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let agent = super::load_agent(config)?;

    let request = EditRequest {
        prompt,
        disambiguation,
        image,
        layout,
        targets: Vec::new(),
    };
    let response = agent.handle(request).await;

    super::emit(&response, response.success)
}
