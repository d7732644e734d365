//! Core configuration types.
//!
//! [`Config`] is built once at startup (by the daemon, from YAML) and handed
//! by reference to [`bootstrap_services`](crate::bootstrap::bootstrap_services).
//! Nothing mutates it afterwards.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::EventFormat;
use crate::protocol_constants::{
    CEC_CLIENT_BINARY, CEC_POWER_ON_FRAME, CEC_STANDBY_COMMAND, SECS_PER_MINUTE,
};

/// Which [`AudioDevice`](crate::device::AudioDevice) implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriverKind {
    /// Shell out to the `cec-client` tool from libcec.
    #[default]
    CecClient,
    /// Log commands without touching hardware.
    DryRun,
}

impl std::str::FromStr for DriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cec-client" => Ok(Self::CecClient),
            "dry-run" => Ok(Self::DryRun),
            other => Err(format!(
                "unknown driver '{}' (expected cec-client or dry-run)",
                other
            )),
        }
    }
}

/// Configuration for the device driver.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DeviceConfig {
    /// Driver implementation.
    pub driver: DriverKind,

    /// Path or name of the `cec-client` executable.
    pub cec_client_path: String,

    /// Upper bound for a single driver command (seconds).
    pub command_timeout_secs: u64,

    /// Command sent to power the receiver on.
    pub power_on_command: String,

    /// Command sent to put the receiver on standby.
    pub standby_command: String,
}

impl DeviceConfig {
    /// Returns the command timeout as a [`Duration`].
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::default(),
            cec_client_path: CEC_CLIENT_BINARY.to_string(),
            command_timeout_secs: 30,
            power_on_command: CEC_POWER_ON_FRAME.to_string(),
            standby_command: CEC_STANDBY_COMMAND.to_string(),
        }
    }
}

/// Integer codes the feed uses for each notification type.
///
/// An unset code never matches, so the corresponding notification is never
/// produced.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationCodes {
    pub stop: Option<i64>,
    pub play: Option<i64>,
    pub pause: Option<i64>,
    pub active_device: Option<i64>,
    pub inactive_device: Option<i64>,
}

/// Configuration for the REST event feed.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EventSourceConfig {
    /// URL polled for playback events.
    pub rest_url: String,

    /// Top-level key holding the array of events.
    pub events_key: String,

    /// Key inside each event holding the notification code.
    pub notification_key: String,

    /// Notification code mapping.
    pub codes: NotificationCodes,

    /// Request timeout for one poll (seconds). `None` waits indefinitely,
    /// which suits long-polling feeds.
    pub request_timeout_secs: Option<u64>,

    /// Delay before polling again after a feed error (milliseconds).
    pub retry_delay_ms: u64,

    /// Minimum time between the starts of two polls (milliseconds). Keeps a
    /// feed that answers immediately from being polled in a tight loop.
    pub min_poll_interval_ms: u64,
}

impl EventSourceConfig {
    /// Returns the JSON layout description used by the decoder.
    #[must_use]
    pub fn format(&self) -> EventFormat {
        EventFormat {
            events_key: self.events_key.clone(),
            notification_key: self.notification_key.clone(),
            codes: self.codes.clone(),
        }
    }

    /// Returns the retry delay as a [`Duration`].
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Returns the minimum poll interval as a [`Duration`].
    #[must_use]
    pub fn min_poll_interval(&self) -> Duration {
        Duration::from_millis(self.min_poll_interval_ms)
    }
}

impl Default for EventSourceConfig {
    fn default() -> Self {
        Self {
            rest_url: String::new(),
            events_key: "events".to_string(),
            notification_key: "notification".to_string(),
            codes: NotificationCodes::default(),
            request_timeout_secs: None,
            retry_delay_ms: 1000,
            min_poll_interval_ms: 500,
        }
    }
}

/// What a `Stop` notification does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopBehavior {
    /// Standby as soon as possible (a zero-length pause).
    #[default]
    Immediate,
    /// Same grace period as a pause.
    GracePeriod,
}

/// What an `InactiveDevice` notification does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InactiveBehavior {
    /// Give up the session and standby immediately.
    #[default]
    Release,
    /// Keep the session and standby after `inactive_standby_delay_secs`.
    ShortDelay,
}

/// Configuration for session power policy.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Grace period between a pause and standby (minutes).
    pub power_off_delay_mins: u64,

    /// Mapping for `Stop` notifications.
    pub stop_behavior: StopBehavior,

    /// Mapping for `InactiveDevice` notifications.
    pub inactive_behavior: InactiveBehavior,

    /// Delay used by [`InactiveBehavior::ShortDelay`] (seconds).
    pub inactive_standby_delay_secs: u64,
}

impl SessionConfig {
    /// Returns the pause grace period as a [`Duration`].
    #[must_use]
    pub fn pause_delay(&self) -> Duration {
        Duration::from_secs(self.power_off_delay_mins.saturating_mul(SECS_PER_MINUTE))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            power_off_delay_mins: 10,
            stop_behavior: StopBehavior::default(),
            inactive_behavior: InactiveBehavior::default(),
            inactive_standby_delay_secs: 5,
        }
    }
}

/// Configuration for the CEC Relay core.
///
/// All fields have sensible defaults except `event.rest_url`, which must be
/// provided before listening for events.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Event feed.
    pub event: EventSourceConfig,
    /// Device driver.
    pub device: DeviceConfig,
    /// Power policy.
    pub session: SessionConfig,
}

impl Config {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.event.rest_url.trim().is_empty() {
            return Err("event.rest_url must be set".to_string());
        }
        if self.event.events_key.is_empty() {
            return Err("event.events_key must not be empty".to_string());
        }
        if self.event.notification_key.is_empty() {
            return Err("event.notification_key must not be empty".to_string());
        }
        if self.event.request_timeout_secs == Some(0) {
            return Err("event.request_timeout_secs must be >= 1 when set".to_string());
        }
        if self.device.command_timeout_secs == 0 {
            return Err("device.command_timeout_secs must be >= 1".to_string());
        }
        if self.device.driver == DriverKind::CecClient && self.device.cec_client_path.is_empty() {
            return Err("device.cec_client_path must not be empty".to_string());
        }
        Ok(())
    }
}
