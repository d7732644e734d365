//! Shared test doubles for driver-facing tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::traits::AudioDevice;
use crate::error::{DeviceError, DeviceResult};

/// A driver method invocation, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCall {
    Initialize,
    PowerOn,
    Standby,
    Cleanup,
}

/// Mock driver that records every call and can be told to time out.
#[derive(Default)]
pub struct RecordingDevice {
    calls: Mutex<Vec<DeviceCall>>,
    fail_commands: AtomicBool,
    missing: AtomicBool,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose `initialize` reports no device.
    pub fn missing() -> Self {
        let device = Self::default();
        device.missing.store(true, Ordering::SeqCst);
        device
    }

    /// Makes subsequent `power_on`/`standby` calls fail with `Unresponsive`.
    pub fn set_failing(&self, failing: bool) {
        self.fail_commands.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: DeviceCall) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    /// Power commands only, without initialize/cleanup.
    pub fn commands(&self) -> Vec<DeviceCall> {
        self.calls
            .lock()
            .iter()
            .copied()
            .filter(|c| matches!(c, DeviceCall::PowerOn | DeviceCall::Standby))
            .collect()
    }

    fn record(&self, call: DeviceCall) -> DeviceResult<()> {
        self.calls.lock().push(call);
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(DeviceError::Unresponsive("simulated timeout".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AudioDevice for RecordingDevice {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn initialize(&self) -> DeviceResult<()> {
        self.calls.lock().push(DeviceCall::Initialize);
        if self.missing.load(Ordering::SeqCst) {
            return Err(DeviceError::NotFound("simulated missing adapter".to_string()));
        }
        Ok(())
    }

    async fn power_on(&self) -> DeviceResult<()> {
        self.record(DeviceCall::PowerOn)
    }

    async fn standby(&self) -> DeviceResult<()> {
        self.record(DeviceCall::Standby)
    }

    async fn cleanup(&self) {
        self.calls.lock().push(DeviceCall::Cleanup);
    }
}
