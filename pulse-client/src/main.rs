//! # Pulse Client
//!
//! Listens to a Pulse signal channel and logs every signal as an alert.
//!
//! # Usage
//!
//! ```bash
//! # Connect to a local server
//! pulse-client
//!
//! # Connect elsewhere with a faster retry
//! pulse-client --url ws://10.0.0.5:8080/ws --reconnect-delay-ms 1000
//!
//! # Load settings from a file; PULSE_CLIENT_* variables override it
//! PULSE_CLIENT_NAME=desk-7 pulse-client --config client.toml
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use pulse_client::{ClientConfig, LoggingHandler, ReconnectingClient};
use pulse_core::config::{ConfigLoader, LoggingConfig, Validatable};
use pulse_telemetry::logging::{LogConfig, init_logging};

/// Pulse signal channel client
#[derive(Parser, Debug)]
#[command(name = "pulse-client")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a client configuration file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the WebSocket endpoint
    #[arg(long)]
    url: Option<String>,

    /// Override the client name sent in the hello message
    #[arg(long)]
    name: Option<String>,

    /// Override the reconnect delay in milliseconds
    #[arg(long)]
    reconnect_delay_ms: Option<u64>,

    /// Log format: pretty or json
    #[arg(long, default_value = "pretty")]
    log_format: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let logging = LoggingConfig {
        level: if args.debug { "debug" } else { "info" }.to_string(),
        format: args.log_format.clone(),
        ..LoggingConfig::default()
    };
    let _guards = init_logging(&LogConfig::from(&logging)).context("initializing logging")?;

    let config = load_config(&args)?;
    info!(url = %config.url, client = %config.client_name, "Starting pulse client");

    let client = ReconnectingClient::new(config, LoggingHandler);
    client
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await;

    Ok(())
}

/// Loads the configuration file, then applies environment and CLI overrides.
fn load_config(args: &Args) -> Result<ClientConfig> {
    let loader = ConfigLoader::new().with_env_prefix("PULSE_CLIENT");
    let mut config = match &args.config {
        Some(path) => loader
            .load_file_with_env::<ClientConfig, _>(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let mut config = ClientConfig::default();
            loader.apply_env(&mut config);
            config
        }
    };

    if let Some(url) = &args.url {
        config.url.clone_from(url);
    }
    if let Some(name) = &args.name {
        config.client_name.clone_from(name);
    }
    if let Some(delay) = args.reconnect_delay_ms {
        config.reconnect_delay_ms = delay;
    }

    config.validate().context("invalid client configuration")?;
    Ok(config)
}
