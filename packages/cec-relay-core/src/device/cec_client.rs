//! Receiver control through the libcec `cec-client` command-line tool.
//!
//! Every command spawns a fresh `cec-client` in single-command mode, writes
//! the command to its stdin and waits for it to exit. The whole exchange is
//! bounded by the configured timeout; a child that outlives it is killed and
//! the call fails with `DeviceError::Unresponsive`.

use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::traits::AudioDevice;
use crate::config::DeviceConfig;
use crate::error::{DeviceError, DeviceResult};
use crate::protocol_constants::{
    CEC_CLIENT_FOUND_DEVICES_MARKER, CEC_CLIENT_LIST_ARG, CEC_CLIENT_SINGLE_COMMAND_ARGS,
};

/// Driver that shells out to `cec-client`.
pub struct CecClientDevice {
    program: String,
    timeout: Duration,
    power_on_command: String,
    standby_command: String,
    initialized: AtomicBool,
}

impl CecClientDevice {
    /// Creates a driver from the device configuration.
    #[must_use]
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            program: config.cec_client_path.clone(),
            timeout: config.command_timeout(),
            power_on_command: config.power_on_command.clone(),
            standby_command: config.standby_command.clone(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Sends one command through `cec-client` in single-command mode.
    async fn send_command(&self, command: &str) -> DeviceResult<()> {
        log::debug!("[CEC] Sending '{}' via {}", command, self.program);
        self.exec(&CEC_CLIENT_SINGLE_COMMAND_ARGS, Some(command))
            .await
            .map(|_| ())
    }

    /// Runs the tool with the given arguments and optional stdin input.
    ///
    /// Returns stdout on a successful exit.
    async fn exec(&self, args: &[&str], input: Option<&str>) -> DeviceResult<String> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;

        let exchange = async move {
            if let Some(mut stdin) = child.stdin.take() {
                if let Some(input) = input {
                    match stdin.write_all(input.as_bytes()).await {
                        Ok(()) => {}
                        // The tool may exit without reading its input.
                        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                            log::debug!("[CEC] stdin closed before command was written");
                        }
                        Err(e) => return Err(DeviceError::Io(e)),
                    }
                }
            }
            child.wait_with_output().await.map_err(DeviceError::Io)
        };

        let output = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                DeviceError::Unresponsive(format!(
                    "{} did not answer within {}s",
                    self.program,
                    self.timeout.as_secs()
                ))
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeviceError::CommandFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn spawn_error(&self, err: std::io::Error) -> DeviceError {
        if err.kind() == ErrorKind::NotFound {
            DeviceError::NotFound(format!("{} not found", self.program))
        } else {
            DeviceError::Io(err)
        }
    }
}

#[async_trait]
impl AudioDevice for CecClientDevice {
    fn name(&self) -> &'static str {
        "cec-client"
    }

    async fn initialize(&self) -> DeviceResult<()> {
        log::info!("[CEC] Initializing audio device controller...");

        let listing = self.exec(&[CEC_CLIENT_LIST_ARG], None).await?;
        match parse_adapter_count(&listing) {
            Some(0) => {
                return Err(DeviceError::NotFound("CEC adapter not found".to_string()));
            }
            Some(count) => log::info!("[CEC] {} adapter(s) detected", count),
            None => log::warn!("[CEC] Could not read adapter count from {}", self.program),
        }

        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn power_on(&self) -> DeviceResult<()> {
        log::info!("[CEC] Sending power on command to audio device...");
        self.send_command(&self.power_on_command).await
    }

    async fn standby(&self) -> DeviceResult<()> {
        log::info!("[CEC] Sending standby command to audio device...");
        self.send_command(&self.standby_command).await
    }

    async fn cleanup(&self) {
        if self.initialized.swap(false, Ordering::SeqCst) {
            log::info!("[CEC] Shutting down audio device controller...");
        }
    }
}

/// Extracts the adapter count from `cec-client -l` output.
fn parse_adapter_count(listing: &str) -> Option<u32> {
    listing.lines().find_map(|line| {
        line.trim()
            .strip_prefix(CEC_CLIENT_FOUND_DEVICES_MARKER)
            .and_then(|rest| rest.trim().parse().ok())
    })
}
