//! CEC Relay - keeps an HDMI-CEC audio receiver powered only while playing.
//!
//! In `listen` mode (the default) this binary polls a playback event feed
//! and powers the receiver on and off as playback starts, pauses and stops.
//! The `power-on` and `standby` subcommands send a single command and exit.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cec_relay_core::{bootstrap_services, create_device, Config, DriverKind};
use clap::{Parser, Subcommand};
use tokio::signal;

use crate::config::DaemonConfig;

/// CEC Relay - playback-driven receiver power control over HDMI-CEC.
#[derive(Parser, Debug)]
#[command(name = "cec-relay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE", env = "CEC_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "CEC_RELAY_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Driver used to reach the receiver (overrides config file).
    #[arg(long, value_name = "cec-client|dry-run")]
    driver: Option<DriverKind>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    /// Listen for playback events and control the receiver (default).
    #[default]
    Listen,
    /// Power the receiver on and exit.
    PowerOn,
    /// Put the receiver on standby and exit.
    Standby,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("CEC Relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        DaemonConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(driver) = args.driver {
        config.driver = driver;
    }

    let core_config = config.to_core_config();

    match args.command.unwrap_or_default() {
        Command::Listen => listen(&core_config).await,
        command => send_once(&core_config, command).await,
    }
}

/// Runs the event loop until Ctrl+C or SIGTERM.
async fn listen(config: &Config) -> Result<()> {
    let services = bootstrap_services(config).context("Failed to bootstrap services")?;

    services
        .start()
        .await
        .context("Failed to initialize audio device")?;

    log::info!(
        "Initialization OK, listening for events on {}",
        config.event.rest_url
    );

    let runner = services.clone();
    let loop_handle = tokio::spawn(async move { runner.run().await });

    // Wait for shutdown signal
    shutdown_signal().await;

    log::info!("Shutdown signal received, cleaning up...");

    // Let the loop finish its current notification before tearing down
    services.cancel_token.cancel();
    if let Err(e) = loop_handle.await {
        log::error!("Event loop task failed: {}", e);
    }

    services.shutdown().await;

    log::info!("Exiting");
    Ok(())
}

/// Sends a single power command, then releases the driver.
async fn send_once(config: &Config, command: Command) -> Result<()> {
    let device = create_device(&config.device);

    device
        .initialize()
        .await
        .context("Failed to initialize audio device")?;

    let result = match command {
        Command::PowerOn => device.power_on().await,
        _ => device.standby().await,
    };
    device.cleanup().await;

    result.with_context(|| format!("Failed to send {:?} command", command))
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_listen() {
        let args = Args::try_parse_from(["cec-relay"]).unwrap();
        assert_eq!(args.command.unwrap_or_default(), Command::Listen);
        assert!(args.driver.is_none());
    }

    #[test]
    fn parses_one_shot_commands() {
        let args = Args::try_parse_from(["cec-relay", "--driver", "dry-run", "power-on"]).unwrap();
        assert_eq!(args.command, Some(Command::PowerOn));
        assert_eq!(args.driver, Some(DriverKind::DryRun));

        let args = Args::try_parse_from(["cec-relay", "standby"]).unwrap();
        assert_eq!(args.command, Some(Command::Standby));
    }

    #[test]
    fn rejects_unknown_driver() {
        assert!(Args::try_parse_from(["cec-relay", "--driver", "infrared"]).is_err());
    }

    #[tokio::test]
    async fn dry_run_one_shot_succeeds() {
        let mut config = Config::default();
        config.device.driver = DriverKind::DryRun;
        send_once(&config, Command::Standby).await.unwrap();
        send_once(&config, Command::PowerOn).await.unwrap();
    }
}
