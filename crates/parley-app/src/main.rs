//! Parley application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing (and optionally write the effective config back)
//! 3. Build the HTTP capability gateway
//! 4. Run the terminal chat loop against one conversation session

mod cli;
mod repl;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use parley_chat::{CapabilityGateway, Message, SessionCoordinator};
use parley_core::config::ParleyConfig;
use parley_gateway::HttpGateway;

use cli::CliArgs;
use repl::Command;

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing so the log level can come from the file;
    // a load failure is reported once the subscriber is up.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = match ParleyConfig::load_if_present(&config_file) {
        Ok(config) => (config, None),
        Err(e) => (ParleyConfig::default(), Some(e)),
    };
    config.general.log_level = args.resolve_log_level(&config.general.log_level);
    config.chat.retention_turns = args.resolve_retention(config.chat.retention_turns);

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Parley v{}", env!("CARGO_PKG_VERSION"));
    match &load_error {
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
    }

    if args.write_config {
        // Never overwrite a file that failed to load with defaults.
        if let Some(e) = load_error {
            return Err(e.into());
        }
        config.save(&config_file)?;
        println!("Wrote configuration to {}", config_file.display());
        return Ok(());
    }

    // Gateway.
    let gateway: Arc<dyn CapabilityGateway> = match HttpGateway::new(config.gateway.clone()) {
        Ok(gw) => Arc::new(gw),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build capability gateway");
            return Err(e.into());
        }
    };

    let mut coordinator = SessionCoordinator::from_config(&config.chat, gateway);

    println!("Parley v{}. Type /quit to leave.", env!("CARGO_PKG_VERSION"));
    println!("{}", repl::IMAGE_USAGE);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let message = match repl::parse_input(&line) {
            Command::Quit => break,
            Command::Skip => {
                prompt();
                continue;
            }
            Command::Invalid(hint) => {
                println!("{}", hint);
                prompt();
                continue;
            }
            Command::Say(text) => Message::text(text),
            Command::Image { path, question } => match repl::load_image(&path) {
                Ok(image) => Message::with_image(question, image),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read image");
                    println!("Could not read image {}: {}", path.display(), e);
                    prompt();
                    continue;
                }
            },
        };

        coordinator.process_turn(message).await;

        println!("{}", repl::render_transcript(coordinator.session()));
        println!();
        prompt();
    }

    let session = coordinator.into_session();
    tracing::info!(
        session_id = %session.id(),
        exchanges = session.exchange_count(),
        "Goodbye"
    );

    Ok(())
}
