//! Centralized error types for the CEC Relay core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Gives every error a stable machine-readable code for log lines
//! - Separates hardware failures from feed failures so the event loop
//!   can treat them differently

use thiserror::Error;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code for log output.
    fn code(&self) -> &'static str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Device Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised by an [`AudioDevice`](crate::device::AudioDevice) driver.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No compatible device or tooling could be found.
    #[error("Device not found: {0}")]
    NotFound(String),

    /// The device (or the tool talking to it) did not answer in time.
    #[error("Device unresponsive: {0}")]
    Unresponsive(String),

    /// The command ran but reported failure.
    #[error("Device command failed: {0}")]
    CommandFailed(String),

    /// Local I/O failure while talking to the driver process.
    #[error("Device I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeviceError {
    /// Returns true if this error should abort startup.
    ///
    /// Only a missing device is fatal; everything else is logged and the
    /// daemon keeps polling.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl ErrorCode for DeviceError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "device_not_found",
            Self::Unresponsive(_) => "device_unresponsive",
            Self::CommandFailed(_) => "device_command_failed",
            Self::Io(_) => "device_io_error",
        }
    }
}

/// Convenient Result alias for driver operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

// ─────────────────────────────────────────────────────────────────────────────
// Event Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while fetching or decoding the playback event feed.
///
/// These never reach the session coordinator.
#[derive(Debug, Error)]
pub enum EventError {
    /// The response did not have the configured shape.
    #[error("Response malformed: {0}")]
    Malformed(String),

    /// HTTP request to the feed failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed answered with something other than the success status.
    #[error("Feed responded with status code {0}")]
    HttpStatus(u16),
}

impl ErrorCode for EventError {
    fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "event_malformed",
            Self::Http(_) => "event_http_failed",
            Self::HttpStatus(_) => "event_http_status",
        }
    }
}

/// Convenient Result alias for event source operations.
pub type EventResult<T> = Result<T, EventError>;

// ─────────────────────────────────────────────────────────────────────────────
// Application Error
// ─────────────────────────────────────────────────────────────────────────────

/// Application-wide error type for the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A driver operation failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The event feed failed.
    #[error(transparent)]
    Event(#[from] EventError),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ErrorCode for RelayError {
    fn code(&self) -> &'static str {
        match self {
            Self::Device(e) => e.code(),
            Self::Event(e) => e.code(),
            Self::Configuration(_) => "configuration_error",
        }
    }
}

/// Convenient Result alias for application-wide operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_found_is_fatal() {
        assert!(DeviceError::NotFound("no adapter".into()).is_fatal());
        assert!(!DeviceError::Unresponsive("timeout".into()).is_fatal());
        assert!(!DeviceError::CommandFailed("exit 1".into()).is_fatal());
    }

    #[test]
    fn relay_error_forwards_inner_code() {
        let err: RelayError = DeviceError::Unresponsive("cec-client".into()).into();
        assert_eq!(err.code(), "device_unresponsive");

        let err: RelayError = EventError::HttpStatus(503).into();
        assert_eq!(err.code(), "event_http_status");
        assert_eq!(err.to_string(), "Feed responded with status code 503");
    }

    #[test]
    fn configuration_error_returns_correct_code() {
        let err = RelayError::Configuration("rest_url is empty".into());
        assert_eq!(err.code(), "configuration_error");
    }
}
