//! Receiver power control.
//!
//! The session coordinator only ever sees the [`AudioDevice`] trait. Concrete
//! drivers are picked at startup from [`DriverKind`]:
//!
//! - [`CecClientDevice`]: drives the receiver through the `cec-client` tool
//! - [`DryRunDevice`]: logs commands, touches no hardware

mod cec_client;
mod dry_run;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod traits;

use std::sync::Arc;

pub use cec_client::CecClientDevice;
pub use dry_run::DryRunDevice;
pub use traits::AudioDevice;

use crate::config::{DeviceConfig, DriverKind};

/// Creates the driver selected by the configuration.
#[must_use]
pub fn create_device(config: &DeviceConfig) -> Arc<dyn AudioDevice> {
    match config.driver {
        DriverKind::CecClient => Arc::new(CecClientDevice::new(config)),
        DriverKind::DryRun => Arc::new(DryRunDevice::new()),
    }
}
