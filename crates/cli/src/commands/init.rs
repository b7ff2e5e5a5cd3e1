//! `pagewright init`: Write a default configuration file.

use pagewright_config::{AppConfig, PROJECT_CONFIG_FILE};
use std::path::Path;
use std::process::ExitCode;

pub async fn run(force: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let path = Path::new(PROJECT_CONFIG_FILE);

    if path.exists() && !force {
        println!("⚠️  {} already exists. Use --force to overwrite.", path.display());
        return Ok(ExitCode::FAILURE);
    }

    std::fs::write(path, AppConfig::default_toml())?;
    println!("✅ Wrote {}", path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set PAGEWRIGHT_API_KEY or add api_key to {}", path.display());
    println!("   2. Check [project] points at your site (components_dir, page_file)");
    println!("   3. Run: pagewright doctor\n");

    Ok(ExitCode::SUCCESS)
}
