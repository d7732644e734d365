//! CEC Relay Core - playback-driven receiver power control.
//!
//! This crate keeps an HDMI-CEC audio receiver powered only while content is
//! playing. It polls a playback event feed, tracks the session state and
//! powers the receiver on, off, or off after a grace period. It is used by
//! the `cec-relay` daemon and can be embedded elsewhere.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`device`]: Receiver drivers behind the [`AudioDevice`] trait
//! - [`events`]: Notification decoding and the REST event source
//! - [`services`]: Session coordinator, notification router, event loop
//! - [`bootstrap`]: Composition root wiring everything together
//! - [`config`]: Immutable core configuration
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! - [`AudioDevice`](device::AudioDevice): Power commands against a receiver
//! - [`NotificationSource`](events::NotificationSource): Batches of decoded
//!   playback notifications
//!
//! Both have production implementations here; tests swap in recorders and
//! scripted feeds.

#![warn(clippy::all)]

pub mod bootstrap;
pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod protocol_constants;
pub mod services;

// Re-export commonly used types at the crate root
pub use config::{
    Config, DeviceConfig, DriverKind, EventSourceConfig, InactiveBehavior, NotificationCodes,
    SessionConfig, StopBehavior,
};
pub use device::{create_device, AudioDevice, CecClientDevice, DryRunDevice};
pub use error::{
    DeviceError, DeviceResult, ErrorCode, EventError, EventResult, RelayError, RelayResult,
};
pub use events::{decode_events, EventFormat, Notification, NotificationSource, RestEventSource};
pub use services::{
    run_event_loop, DispatchPolicy, NotificationRouter, PollTiming, SessionCoordinator,
    SessionSnapshot, SessionState,
};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, bootstrap_services_with_device, BootstrappedServices};
