//! Daemon configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{Context, Result};
use cec_relay_core::{
    Config, DeviceConfig, DriverKind, EventSourceConfig, InactiveBehavior, NotificationCodes,
    SessionConfig, StopBehavior,
};
use serde::Deserialize;

/// Daemon configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// URL polled for playback events.
    /// Override: `CEC_RELAY_REST_URL`
    pub rest_url: String,

    /// Top-level JSON key holding the array of events.
    pub events_key: String,

    /// JSON key inside each event holding the notification code.
    pub notification_key: String,

    /// Integer code for each notification type.
    pub notification_codes: NotificationCodes,

    /// Per-request timeout in seconds. Leave unset for long-polling feeds.
    pub request_timeout_secs: Option<u64>,

    /// Delay before polling again after a feed error (milliseconds).
    pub retry_delay_ms: u64,

    /// Minimum time between two polls (milliseconds).
    pub min_poll_interval_ms: u64,

    /// Minutes between a pause and receiver standby.
    /// Override: `CEC_RELAY_POWER_OFF_DELAY_MINS`
    pub power_off_delay_mins: u64,

    /// `immediate` or `grace-period`.
    pub stop_behavior: StopBehavior,

    /// `release` or `short-delay`.
    pub inactive_behavior: InactiveBehavior,

    /// Standby delay for `short-delay` (seconds).
    pub inactive_standby_delay_secs: u64,

    /// `cec-client` or `dry-run`.
    /// Override: `CEC_RELAY_DRIVER`
    pub driver: DriverKind,

    /// Path or name of the `cec-client` executable.
    pub cec_client_path: String,

    /// Upper bound for a single CEC command (seconds).
    pub command_timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        let event = EventSourceConfig::default();
        let session = SessionConfig::default();
        let device = DeviceConfig::default();

        Self {
            rest_url: event.rest_url,
            events_key: event.events_key,
            notification_key: event.notification_key,
            notification_codes: event.codes,
            request_timeout_secs: event.request_timeout_secs,
            retry_delay_ms: event.retry_delay_ms,
            min_poll_interval_ms: event.min_poll_interval_ms,
            power_off_delay_mins: session.power_off_delay_mins,
            stop_behavior: session.stop_behavior,
            inactive_behavior: session.inactive_behavior,
            inactive_standby_delay_secs: session.inactive_standby_delay_secs,
            driver: device.driver,
            cec_client_path: device.cec_client_path,
            command_timeout_secs: device.command_timeout_secs,
        }
    }
}

impl DaemonConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies overrides from `lookup` (the process environment in production).
    ///
    /// Unparseable values are logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("CEC_RELAY_REST_URL") {
            self.rest_url = url;
        }

        if let Some(val) = lookup("CEC_RELAY_POWER_OFF_DELAY_MINS") {
            match val.parse() {
                Ok(mins) => self.power_off_delay_mins = mins,
                Err(_) => log::warn!("Ignoring invalid CEC_RELAY_POWER_OFF_DELAY_MINS: {}", val),
            }
        }

        if let Some(val) = lookup("CEC_RELAY_DRIVER") {
            match val.parse() {
                Ok(driver) => self.driver = driver,
                Err(e) => log::warn!("Ignoring CEC_RELAY_DRIVER: {}", e),
            }
        }
    }

    /// Converts to cec-relay-core's Config type.
    pub fn to_core_config(&self) -> Config {
        Config {
            event: EventSourceConfig {
                rest_url: self.rest_url.clone(),
                events_key: self.events_key.clone(),
                notification_key: self.notification_key.clone(),
                codes: self.notification_codes.clone(),
                request_timeout_secs: self.request_timeout_secs,
                retry_delay_ms: self.retry_delay_ms,
                min_poll_interval_ms: self.min_poll_interval_ms,
            },
            device: DeviceConfig {
                driver: self.driver,
                cec_client_path: self.cec_client_path.clone(),
                command_timeout_secs: self.command_timeout_secs,
                ..Default::default()
            },
            session: SessionConfig {
                power_off_delay_mins: self.power_off_delay_mins,
                stop_behavior: self.stop_behavior,
                inactive_behavior: self.inactive_behavior,
                inactive_standby_delay_secs: self.inactive_standby_delay_secs,
            },
        }
    }
}
