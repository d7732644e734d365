//! Driver that logs commands instead of sending them.
//!
//! Useful for exercising a feed configuration on a machine without a CEC
//! adapter: the log shows exactly when the receiver would switch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use super::traits::AudioDevice;
use crate::error::DeviceResult;

/// Hardware-free [`AudioDevice`].
#[derive(Default)]
pub struct DryRunDevice {
    initialized: AtomicBool,
    power_on_count: AtomicU64,
    standby_count: AtomicU64,
}

impl DryRunDevice {
    /// Creates a new dry-run driver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of power-on commands issued so far.
    pub fn power_on_count(&self) -> u64 {
        self.power_on_count.load(Ordering::Relaxed)
    }

    /// Number of standby commands issued so far.
    pub fn standby_count(&self) -> u64 {
        self.standby_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AudioDevice for DryRunDevice {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn initialize(&self) -> DeviceResult<()> {
        self.initialized.store(true, Ordering::SeqCst);
        log::info!("[DryRun] Initialized (no hardware will be controlled)");
        Ok(())
    }

    async fn power_on(&self) -> DeviceResult<()> {
        let n = self.power_on_count.fetch_add(1, Ordering::Relaxed) + 1;
        log::info!("[DryRun] power on (#{})", n);
        Ok(())
    }

    async fn standby(&self) -> DeviceResult<()> {
        let n = self.standby_count.fetch_add(1, Ordering::Relaxed) + 1;
        log::info!("[DryRun] standby (#{})", n);
        Ok(())
    }

    async fn cleanup(&self) {
        if self.initialized.swap(false, Ordering::SeqCst) {
            log::info!("[DryRun] Cleaned up");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_commands() {
        let device = DryRunDevice::new();
        device.initialize().await.unwrap();
        device.power_on().await.unwrap();
        device.standby().await.unwrap();
        device.standby().await.unwrap();

        assert_eq!(device.power_on_count(), 1);
        assert_eq!(device.standby_count(), 2);

        device.cleanup().await;
        device.cleanup().await;
    }
}
