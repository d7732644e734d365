//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root - the single place where the
//! driver, session coordinator, router and event source are instantiated
//! and wired together.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::device::{create_device, AudioDevice};
use crate::error::{ErrorCode, RelayError, RelayResult};
use crate::events::{NotificationSource, RestEventSource};
use crate::services::{
    run_event_loop, DispatchPolicy, NotificationRouter, PollTiming, SessionCoordinator,
};

/// Container for all bootstrapped services.
#[derive(Clone)]
pub struct BootstrappedServices {
    /// Owns the receiver session and the driver.
    pub session: Arc<SessionCoordinator>,
    /// Maps notifications to session operations.
    pub router: Arc<NotificationRouter>,
    /// Playback event feed.
    pub source: Arc<dyn NotificationSource>,
    /// Cancellation token for graceful shutdown.
    pub cancel_token: CancellationToken,
    /// Delays between polls of the feed.
    timing: PollTiming,
}

impl BootstrappedServices {
    /// Initializes the driver.
    ///
    /// # Errors
    ///
    /// Returns an error only if no device could be found; other
    /// initialization failures are logged and the daemon carries on, since
    /// each later command makes its own attempt.
    pub async fn start(&self) -> RelayResult<()> {
        match self.session.initialize().await {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                log::warn!(
                    "[Bootstrap] Driver initialization incomplete ({}): {}",
                    e.code(),
                    e
                );
                Ok(())
            }
        }
    }

    /// Runs the event loop until [`shutdown`](Self::shutdown) is called.
    pub async fn run(&self) {
        run_event_loop(
            Arc::clone(&self.source),
            Arc::clone(&self.router),
            self.timing,
            self.cancel_token.clone(),
        )
        .await;
    }

    /// Stops the event loop and tears the session down.
    ///
    /// The receiver is always sent to standby before the driver is released.
    /// Callers running [`run`](Self::run) on another task should cancel the
    /// token and await that task first, so no notification is dispatched
    /// after teardown.
    pub async fn shutdown(&self) {
        log::info!("[Bootstrap] Beginning graceful shutdown...");

        self.cancel_token.cancel();

        if let Err(e) = self.session.shutdown().await {
            log::error!("[Bootstrap] Final standby failed ({}): {}", e.code(), e);
        }

        log::info!("[Bootstrap] Shutdown complete");
    }
}

/// Bootstraps all services, creating the driver selected in `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the HTTP client
/// cannot be created.
pub fn bootstrap_services(config: &Config) -> RelayResult<BootstrappedServices> {
    let device = create_device(&config.device);
    bootstrap_services_with_device(config, device)
}

/// Bootstraps all services around an explicit driver.
///
/// Wiring order:
///
/// 1. Session coordinator (owns the driver)
/// 2. Router (depends on the coordinator and the dispatch policy)
/// 3. REST event source
pub fn bootstrap_services_with_device(
    config: &Config,
    device: Arc<dyn AudioDevice>,
) -> RelayResult<BootstrappedServices> {
    config.validate().map_err(RelayError::Configuration)?;

    log::info!("[Bootstrap] Using {} driver", device.name());

    let session = Arc::new(SessionCoordinator::new(device));
    let router = Arc::new(NotificationRouter::new(
        Arc::clone(&session),
        DispatchPolicy::from(&config.session),
    ));
    let source = RestEventSource::new(&config.event)?;
    log::info!("[Bootstrap] Polling events from {}", source.url());

    Ok(BootstrappedServices {
        session,
        router,
        source: Arc::new(source),
        cancel_token: CancellationToken::new(),
        timing: PollTiming::from(&config.event),
    })
}
