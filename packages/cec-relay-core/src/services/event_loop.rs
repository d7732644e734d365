//! The daemon's main loop: poll the feed, dispatch what arrives.
//!
//! Notifications are handled strictly one at a time, in feed order. Neither
//! a failed driver command nor a feed error ends the loop; only the
//! cancellation token does.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::EventSourceConfig;
use crate::error::ErrorCode;
use crate::events::NotificationSource;

use super::router::NotificationRouter;

/// Delays between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    /// Wait after a feed error before polling again.
    pub retry_delay: Duration,
    /// Minimum time between the starts of two successful polls. A
    /// long-polling feed that holds each request longer is never slowed down.
    pub min_interval: Duration,
}

impl From<&EventSourceConfig> for PollTiming {
    fn from(config: &EventSourceConfig) -> Self {
        Self {
            retry_delay: config.retry_delay(),
            min_interval: config.min_poll_interval(),
        }
    }
}

/// Polls `source` and dispatches every notification until `cancel` fires.
///
/// Cancellation is honored while waiting on the feed or a delay and between
/// notifications; a dispatch already in progress is allowed to finish.
pub async fn run_event_loop(
    source: Arc<dyn NotificationSource>,
    router: Arc<NotificationRouter>,
    timing: PollTiming,
    cancel: CancellationToken,
) {
    log::info!("[EventLoop] Listening for events");

    loop {
        let polled_at = Instant::now();
        let batch = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            batch = source.next_batch() => batch,
        };

        let resume_at = match batch {
            Ok(notifications) => {
                for notification in notifications {
                    if cancel.is_cancelled() {
                        log::debug!("[EventLoop] Dropping rest of batch on shutdown");
                        break;
                    }
                    if let Err(e) = router.dispatch(notification).await {
                        log::error!(
                            "[EventLoop] {:?} failed ({}): {}",
                            notification,
                            e.code(),
                            e
                        );
                    }
                }
                polled_at + timing.min_interval
            }
            Err(e) => {
                log::warn!("[EventLoop] Feed error ({}): {}", e.code(), e);
                Instant::now() + timing.retry_delay
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep_until(resume_at) => {}
        }
    }

    log::info!("[EventLoop] Stopped");
}
