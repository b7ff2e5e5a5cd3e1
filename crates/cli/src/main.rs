//! Pagewright CLI: the main entry point.
//!
//! Commands:
//! - `init`: Write a default `pagewright.toml`
//! - `edit`: Apply a free-text instruction to the page
//! - `batch`: Run explicit tool decisions from a JSON file
//! - `validate`: Run the self-healing validator on one component
//! - `classify`: Show how an instruction would be understood
//! - `components`: List the known components
//! - `serve`: Start the HTTP gateway
//! - `doctor`: Diagnose configuration and tooling

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(
    name = "pagewright",
    about = "Pagewright — natural-language edits for landing page components",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file (default: ./pagewright.toml, then ~/.pagewright/config.toml)
    #[arg(short, long, global = true, env = "PAGEWRIGHT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default pagewright.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Apply a free-text instruction
    Edit {
        /// The instruction, e.g. "hero: change the button color to blue"
        prompt: String,

        /// Answer to a previous clarification question
        #[arg(short, long)]
        disambiguation: Option<String>,

        /// Attached image (URL or path)
        #[arg(long)]
        image: Option<String>,

        /// Attached layout sketch (URL or path)
        #[arg(long)]
        layout: Option<String>,
    },

    /// Run tool decisions from a JSON file, in order
    Batch {
        /// A JSON array of decisions, or `{"decisions": [...], "softFail": bool}`
        file: PathBuf,
    },

    /// Check one component and repair it if needed
    Validate {
        /// Component name, e.g. Hero
        component: String,

        /// Accept the document after the last failed repair
        #[arg(long)]
        soft: bool,
    },

    /// Classify an instruction without changing anything
    Classify {
        prompt: String,
    },

    /// List the components found in the project
    Components,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Diagnose configuration and tooling
    Doctor,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = cli.config.as_deref();
    let code = match cli.command {
        Commands::Init { force } => commands::init::run(force).await?,
        Commands::Edit {
            prompt,
            disambiguation,
            image,
            layout,
        } => commands::edit::run(config, prompt, disambiguation, image, layout).await?,
        Commands::Batch { file } => commands::batch::run(config, &file).await?,
        Commands::Validate { component, soft } => {
            commands::validate::run(config, &component, soft).await?
        }
        Commands::Classify { prompt } => commands::classify::run(config, &prompt).await?,
        Commands::Components => commands::components::run(config).await?,
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Doctor => commands::doctor::run(config).await?,
    };

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_edit_with_attachments() {
        let cli = Cli::try_parse_from([
            "pagewright",
            "edit",
            "use this picture in the hero",
            "--image",
            "hero.png",
        ])
        .unwrap();
        match cli.command {
            Commands::Edit { prompt, image, layout, .. } => {
                assert_eq!(prompt, "use this picture in the hero");
                assert_eq!(image.as_deref(), Some("hero.png"));
                assert!(layout.is_none());
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "pagewright",
            "validate",
            "Hero",
            "--soft",
            "--verbose",
            "--json-logs",
            "--config",
            "site.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert_eq!(cli.config, Some(PathBuf::from("site.toml")));
        assert!(matches!(cli.command, Commands::Validate { soft: true, .. }));
    }

    #[test]
    fn edit_requires_a_prompt() {
        assert!(Cli::try_parse_from(["pagewright", "edit"]).is_err());
    }

    #[test]
    fn serve_port_override() {
        let cli = Cli::try_parse_from(["pagewright", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000) }));
    }
}
