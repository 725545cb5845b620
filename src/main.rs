mod cli;
mod config;
mod error;
mod format;
mod keywords;
mod marker;
mod origin;
mod platform;
mod record;
mod suppressor;

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;
use crate::format::Renderer;
use crate::platform::rtm::RtmConnection;
use crate::platform::slack::SlackClient;
use crate::suppressor::Suppressor;

/// Inbound events buffered between the connection manager and the event loop
const EVENT_BUFFER: usize = 50;

/// Environment variable holding the Slack API token
const TOKEN_ENV: &str = "SLACK_TOKEN";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only suppression records
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,slack_suppressor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = config::expand_home(&cli.config);
    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Keywords: {:?}", config.keywords);
    info!("  Printer: {}", cli.printer);
    info!("  On mark error: {:?}", config.suppressor.on_mark_error);
    if config.keywords.is_empty() {
        warn!("No keywords configured, nothing will be suppressed");
    }

    let token = std::env::var(TOKEN_ENV).unwrap_or_default();
    if token.trim().is_empty() {
        warn!("{} is not set", TOKEN_ENV);
    }
    let client =
        SlackClient::new(&config.slack, &token).context("Failed to create Slack client")?;

    let connection = RtmConnection::new(
        client.clone(),
        config.slack.reconnect_delay(),
        config.slack.ping_interval(),
    );
    let (mut events, connection_task) = connection.spawn(EVENT_BUFFER);

    let emphasis = !cli.no_color && std::io::stdout().is_terminal();
    let suppressor = Suppressor::new(
        Arc::new(client),
        config.keywords,
        Renderer::new(cli.printer, emphasis),
        config.suppressor.on_mark_error,
    );

    info!("Suppressor is starting...");
    let mut stdout = std::io::stdout();
    tokio::select! {
        exit = suppressor.run(&mut events, &mut stdout) => {
            info!("Event loop stopped: {:?}", exit);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
        }
    }

    connection_task.abort();
    Ok(())
}
