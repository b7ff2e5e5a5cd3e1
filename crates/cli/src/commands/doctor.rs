//! `pagewright doctor`: Diagnose configuration and tooling.

use pagewright_config::{AppConfig, PROJECT_CONFIG_FILE};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

pub async fn run(config_path: Option<&Path>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    println!("🩺 Pagewright Doctor — Project Diagnostics");
    println!("==========================================\n");

    let mut issues = 0;

    // Config
    let explicit = config_path.map(Path::to_path_buf);
    let local = Path::new(PROJECT_CONFIG_FILE);
    let user = AppConfig::config_dir().join("config.toml");
    match explicit.as_deref() {
        Some(path) if path.exists() => println!("  ✅ Config file: {}", path.display()),
        Some(path) => {
            println!("  ⚠️  {} not found — using defaults", path.display());
            issues += 1;
        }
        None if local.exists() => println!("  ✅ Config file: {}", local.display()),
        None if user.exists() => println!("  ✅ Config file: {}", user.display()),
        None => println!("  ⚠️  No config file — using defaults (run `pagewright init`)"),
    }

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    // Completion service
    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key — set PAGEWRIGHT_API_KEY or api_key in the config");
        issues += 1;
    }

    let router = pagewright_providers::build_from_config(&config);
    match router.default() {
        Some(provider) => match provider.health_check().await {
            Ok(true) => println!(
                "  ✅ Provider '{}' reachable ({})",
                config.default_provider, config.default_model
            ),
            Ok(false) => {
                println!("  ⚠️  Provider '{}' answered but reported unhealthy", config.default_provider);
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", config.default_provider);
                issues += 1;
            }
        },
        None => {
            println!("  ❌ Provider '{}' is not configured", config.default_provider);
            issues += 1;
        }
    }

    // Structural checker
    if config.validator.enabled {
        if checker_available(&config).await {
            println!("  ✅ Checker program '{}' found", config.validator.program);
        } else {
            println!(
                "  ❌ Checker program '{}' could not be started",
                config.validator.program
            );
            issues += 1;
        }
    } else {
        println!("  ⚠️  Validation disabled ([validator] enabled = false)");
    }

    // Project layout
    let root = config.project.root_path();
    let page = root.join(&config.project.page_file);
    if page.exists() {
        println!("  ✅ Page file: {}", page.display());
    } else {
        println!("  ❌ Page file missing: {}", page.display());
        issues += 1;
    }

    match pagewright_agent::PageAgent::from_config(&config) {
        Ok(agent) => match agent.known_targets().await {
            Ok(components) if components.is_empty() => {
                println!("  ⚠️  No components in {}", config.project.components_dir);
                issues += 1;
            }
            Ok(components) => {
                println!("  ✅ {} component(s): {}", components.len(), components.join(", "))
            }
            Err(e) => {
                println!("  ❌ Cannot list components: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(super::exit_code(issues == 0))
}

async fn checker_available(config: &AppConfig) -> bool {
    let probe = tokio::process::Command::new(&config.validator.program)
        .arg("--version")
        .current_dir(config.project.root_path())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status();

    matches!(
        tokio::time::timeout(Duration::from_secs(config.validator.timeout_secs), probe).await,
        Ok(Ok(_))
    )
}
