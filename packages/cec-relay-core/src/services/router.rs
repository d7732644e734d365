//! Maps decoded notifications onto session operations.
//!
//! Feeds disagree on what `Stop` and `InactiveDevice` should mean, so those
//! two mappings come from [`DispatchPolicy`] rather than being hard-coded.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{InactiveBehavior, SessionConfig, StopBehavior};
use crate::error::DeviceResult;
use crate::events::Notification;

use super::session_coordinator::SessionCoordinator;

/// How notifications translate into session operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Grace period for `Pause` (and `Stop` under [`StopBehavior::GracePeriod`]).
    pub pause_delay: Duration,
    /// Mapping for `Stop`.
    pub stop: StopBehavior,
    /// Mapping for `InactiveDevice`.
    pub inactive: InactiveBehavior,
    /// Delay used by [`InactiveBehavior::ShortDelay`].
    pub inactive_delay: Duration,
}

impl From<&SessionConfig> for DispatchPolicy {
    fn from(config: &SessionConfig) -> Self {
        Self {
            pause_delay: config.pause_delay(),
            stop: config.stop_behavior,
            inactive: config.inactive_behavior,
            inactive_delay: Duration::from_secs(config.inactive_standby_delay_secs),
        }
    }
}

/// Dispatches notifications to the [`SessionCoordinator`].
pub struct NotificationRouter {
    session: Arc<SessionCoordinator>,
    policy: DispatchPolicy,
}

impl NotificationRouter {
    pub fn new(session: Arc<SessionCoordinator>, policy: DispatchPolicy) -> Self {
        Self { session, policy }
    }

    /// Applies one notification.
    ///
    /// # Errors
    /// Propagates the driver error raised by the triggered operation.
    pub async fn dispatch(&self, notification: Notification) -> DeviceResult<()> {
        log::debug!("[Router] {:?}", notification);

        match notification {
            Notification::ActiveDevice => self.session.set_active(true).await,
            Notification::InactiveDevice => match self.policy.inactive {
                InactiveBehavior::Release => self.session.set_active(false).await,
                InactiveBehavior::ShortDelay => {
                    self.session.release_after(self.policy.inactive_delay).await;
                    Ok(())
                }
            },
            Notification::Play => self.session.play().await,
            Notification::Pause => {
                self.session.pause(self.policy.pause_delay).await;
                Ok(())
            }
            Notification::Stop => {
                let delay = match self.policy.stop {
                    StopBehavior::Immediate => Duration::ZERO,
                    StopBehavior::GracePeriod => self.policy.pause_delay,
                };
                self.session.pause(delay).await;
                Ok(())
            }
            Notification::Unknown(code) => {
                log::warn!("[Router] Type of playback event not recognised: {}", code);
                Ok(())
            }
        }
    }

    /// Returns the coordinator this router drives.
    pub fn session(&self) -> &Arc<SessionCoordinator> {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::test_fixtures::{DeviceCall, RecordingDevice};
    use crate::device::AudioDevice;
    use crate::services::session_coordinator::SessionState;

    const PAUSE: Duration = Duration::from_secs(600);

    fn router(stop: StopBehavior, inactive: InactiveBehavior) -> (Arc<RecordingDevice>, NotificationRouter) {
        let device = Arc::new(RecordingDevice::new());
        let session = Arc::new(SessionCoordinator::new(
            Arc::clone(&device) as Arc<dyn AudioDevice>
        ));
        let policy = DispatchPolicy {
            pause_delay: PAUSE,
            stop,
            inactive,
            inactive_delay: Duration::from_secs(5),
        };
        (device, NotificationRouter::new(session, policy))
    }

    #[test]
    fn policy_from_session_config() {
        let policy = DispatchPolicy::from(&SessionConfig::default());
        assert_eq!(policy.pause_delay, Duration::from_secs(600));
        assert_eq!(policy.stop, StopBehavior::Immediate);
        assert_eq!(policy.inactive, InactiveBehavior::Release);
        assert_eq!(policy.inactive_delay, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_uses_configured_delay() {
        let (device, router) = router(StopBehavior::Immediate, InactiveBehavior::Release);

        router.dispatch(Notification::ActiveDevice).await.unwrap();
        router.dispatch(Notification::Pause).await.unwrap();

        tokio::time::sleep(PAUSE - Duration::from_secs(1)).await;
        assert_eq!(router.session().state().await, SessionState::ShortPause);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(device.commands(), vec![DeviceCall::PowerOn, DeviceCall::Standby]);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_stop_standbys_promptly() {
        let (device, router) = router(StopBehavior::Immediate, InactiveBehavior::Release);

        router.dispatch(Notification::ActiveDevice).await.unwrap();
        router.dispatch(Notification::Stop).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(device.commands(), vec![DeviceCall::PowerOn, DeviceCall::Standby]);
        assert_eq!(router.session().state().await, SessionState::LongPause);
    }

    #[tokio::test(start_paused = true)]
    async fn grace_period_stop_waits() {
        let (device, router) = router(StopBehavior::GracePeriod, InactiveBehavior::Release);

        router.dispatch(Notification::ActiveDevice).await.unwrap();
        router.dispatch(Notification::Stop).await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(device.commands(), vec![DeviceCall::PowerOn]);
        assert_eq!(router.session().state().await, SessionState::ShortPause);
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_release_standbys_immediately() {
        let (device, router) = router(StopBehavior::Immediate, InactiveBehavior::Release);

        router.dispatch(Notification::ActiveDevice).await.unwrap();
        router.dispatch(Notification::InactiveDevice).await.unwrap();

        assert_eq!(device.commands(), vec![DeviceCall::PowerOn, DeviceCall::Standby]);
        assert_eq!(router.session().state().await, SessionState::Inactive);
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_short_delay_releases_after_delay() {
        let (device, router) = router(StopBehavior::Immediate, InactiveBehavior::ShortDelay);

        router.dispatch(Notification::ActiveDevice).await.unwrap();
        router.dispatch(Notification::InactiveDevice).await.unwrap();
        assert_eq!(device.commands(), vec![DeviceCall::PowerOn]);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(device.commands(), vec![DeviceCall::PowerOn, DeviceCall::Standby]);
        assert_eq!(router.session().state().await, SessionState::Inactive);

        router.dispatch(Notification::ActiveDevice).await.unwrap();
        assert_eq!(
            device.commands(),
            vec![DeviceCall::PowerOn, DeviceCall::Standby, DeviceCall::PowerOn]
        );
        assert_eq!(router.session().state().await, SessionState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_short_delay_overrides_pending_pause() {
        let (device, router) = router(StopBehavior::Immediate, InactiveBehavior::ShortDelay);

        router.dispatch(Notification::ActiveDevice).await.unwrap();
        router.dispatch(Notification::Pause).await.unwrap();
        router.dispatch(Notification::InactiveDevice).await.unwrap();

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(device.commands(), vec![DeviceCall::PowerOn, DeviceCall::Standby]);
        assert_eq!(router.session().state().await, SessionState::Inactive);
    }

    #[tokio::test(start_paused = true)]
    async fn play_after_pause_resumes_without_commands() {
        let (device, router) = router(StopBehavior::Immediate, InactiveBehavior::Release);

        router.dispatch(Notification::ActiveDevice).await.unwrap();
        router.dispatch(Notification::Pause).await.unwrap();
        router.dispatch(Notification::Play).await.unwrap();

        assert_eq!(device.commands(), vec![DeviceCall::PowerOn]);
        assert_eq!(router.session().state().await, SessionState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_is_ignored() {
        let (device, router) = router(StopBehavior::Immediate, InactiveBehavior::Release);

        router.dispatch(Notification::Unknown(42)).await.unwrap();

        assert!(device.calls().is_empty());
    }
}
