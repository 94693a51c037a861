//! Staffroom - terminal client for the Teacher's AI Assistant
//!
#![doc = "Main entry point for the Staffroom client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use staffroom::cli::{Cli, Commands};
use staffroom::commands;
use staffroom::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Ask {
            message,
            conversation_id,
        } => {
            tracing::info!("Sending single question");
            if let Some(id) = &conversation_id {
                tracing::debug!("Continuing conversation: {}", id);
            }
            commands::ask::run_ask(config, message, conversation_id).await?;
            Ok(())
        }
        Commands::Upload { file } => {
            tracing::info!("Uploading document: {}", file.display());
            commands::upload::run_upload(config, file).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never mix with rendered chat output.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "staffroom=debug"
    } else {
        "staffroom=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
