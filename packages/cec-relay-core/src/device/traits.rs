//! Trait abstraction for receiver power control.
//!
//! Enables dependency injection: the session coordinator depends on this
//! trait rather than on a concrete driver, so tests can swap in a recorder.

use async_trait::async_trait;

use crate::error::DeviceResult;

/// Capability surface of an audio receiver.
///
/// Every method makes a single attempt bounded by the driver's own timeout.
/// Drivers never retry; the caller decides what to do with a failure.
#[async_trait]
pub trait AudioDevice: Send + Sync {
    /// Short driver name for log lines.
    fn name(&self) -> &'static str;

    /// Establishes the channel to the receiver.
    ///
    /// # Errors
    /// `DeviceError::NotFound` if no compatible device or tooling is present,
    /// `DeviceError::Unresponsive` on timeout.
    async fn initialize(&self) -> DeviceResult<()>;

    /// Powers the receiver on.
    ///
    /// # Errors
    /// `DeviceError::Unresponsive` on timeout.
    async fn power_on(&self) -> DeviceResult<()>;

    /// Puts the receiver on standby.
    ///
    /// # Errors
    /// `DeviceError::Unresponsive` on timeout.
    async fn standby(&self) -> DeviceResult<()>;

    /// Releases the channel.
    ///
    /// Safe to call when never initialized, and idempotent.
    async fn cleanup(&self);
}
