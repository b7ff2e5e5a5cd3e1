//! `pagewright serve`: Start the HTTP API server.

use std::path::Path;
use std::process::ExitCode;

pub async fn run(
    config: Option<&Path>,
    port_override: Option<u16>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = super::load_config(config)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("📝 Pagewright Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Project:   {}", config.project.root);

    pagewright_gateway::start(config).await?;

    Ok(ExitCode::SUCCESS)
}
