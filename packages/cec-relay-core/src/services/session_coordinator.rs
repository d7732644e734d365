//! Playback session state and receiver power decisions.
//!
//! Responsibilities:
//! - Power the receiver on when this client becomes the active source or
//!   playback resumes after the receiver went to standby
//! - Standby immediately when the client stops being the active source, or
//!   after a short delay when the release is deferred
//! - Standby after a grace period when playback pauses, unless playback
//!   resumes first
//! - Force standby and release the driver on shutdown
//!
//! # Concurrency design
//!
//! All session fields live behind one `tokio::sync::Mutex`, and driver calls
//! are made while holding it, so public operations and timer bodies never
//! interleave. At most one timer is pending at a time. Each runs on its own
//! task: it sleeps until the deadline (or until its token is cancelled), then
//! takes the lock and proceeds only if the pending slot still carries its own
//! id. Cancelling therefore means clearing the slot under the lock; the token
//! merely lets a cancelled task exit early instead of sleeping out its delay.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::device::AudioDevice;
use crate::error::{DeviceResult, ErrorCode};

/// Externally visible session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Another source owns the receiver; it is off.
    Inactive,
    /// Active and the receiver is on with no standby pending.
    Playing,
    /// Paused or releasing; the receiver is still on and a standby is pending.
    ShortPause,
    /// Active, but the receiver went to standby.
    LongPause,
}

/// Point-in-time copy of the session fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Whether this client currently owns the receiver.
    pub active: bool,
    /// Whether the receiver is believed to be powered.
    pub device_on: bool,
    /// Whether a deferred standby or release is scheduled.
    pub standby_pending: bool,
}

impl SessionSnapshot {
    /// Classifies the snapshot into a [`SessionState`].
    #[must_use]
    pub fn state(&self) -> SessionState {
        match (self.active, self.device_on, self.standby_pending) {
            (false, _, _) => SessionState::Inactive,
            (true, true, true) => SessionState::ShortPause,
            (true, true, false) => SessionState::Playing,
            (true, false, _) => SessionState::LongPause,
        }
    }
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "active: {}, device on: {}, standby pending: {}",
            self.active, self.device_on, self.standby_pending
        )
    }
}

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    /// Pause grace period: standby, session stays active.
    Standby,
    /// Deferred deactivation: same as `set_active(false)`.
    Release,
}

/// Handle for the single outstanding timer.
struct PendingTimer {
    id: u64,
    action: TimerAction,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Session {
    active: bool,
    device_on: bool,
    pending: Option<PendingTimer>,
    next_timer_id: u64,
}

impl Session {
    /// Cancels the pending timer, if any, and returns its action.
    fn cancel_pending(&mut self) -> Option<TimerAction> {
        self.pending.take().map(|pending| {
            pending.cancel.cancel();
            pending.action
        })
    }

    /// Stores a new pending timer and returns its id and token.
    fn arm(&mut self, action: TimerAction) -> (u64, CancellationToken) {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let cancel = CancellationToken::new();
        self.pending = Some(PendingTimer {
            id,
            action,
            cancel: cancel.clone(),
        });
        (id, cancel)
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active: self.active,
            device_on: self.device_on,
            standby_pending: self.pending.is_some(),
        }
    }
}

/// Decides when the receiver is powered on or put on standby.
///
/// The only component allowed to call the [`AudioDevice`]. State flags are
/// updated before the driver call and are not rolled back when it fails: they
/// describe the intended receiver condition. Driver errors propagate to the
/// caller of the triggering operation.
pub struct SessionCoordinator {
    device: Arc<dyn AudioDevice>,
    session: Arc<Mutex<Session>>,
}

impl SessionCoordinator {
    /// Creates an inactive session bound to the given driver.
    pub fn new(device: Arc<dyn AudioDevice>) -> Self {
        Self {
            device,
            session: Arc::new(Mutex::new(Session::default())),
        }
    }

    /// Initializes the underlying driver.
    pub async fn initialize(&self) -> DeviceResult<()> {
        self.device.initialize().await
    }

    /// Marks this client as (in)active.
    ///
    /// Becoming active powers the receiver on; becoming inactive cancels any
    /// pending timer and sends standby right away. Repeating the current
    /// value does nothing, except that re-activation cancels a pending
    /// deferred release.
    pub async fn set_active(&self, new_active: bool) -> DeviceResult<()> {
        let mut session = self.session.lock().await;
        log::debug!("[Session] set_active({}) - {}", new_active, session.snapshot());

        match (session.active, new_active) {
            (false, true) => {
                session.active = true;
                session.device_on = true;
                self.device.power_on().await
            }
            (true, false) => {
                if session.cancel_pending().is_some() {
                    log::debug!("[Session] Cancelled pending timer on deactivation");
                }
                release(&mut session, self.device.as_ref()).await
            }
            (true, true) => {
                if session
                    .pending
                    .as_ref()
                    .is_some_and(|pending| pending.action == TimerAction::Release)
                {
                    session.cancel_pending();
                    log::info!("[Session] Active again, deferred release cancelled");
                }
                Ok(())
            }
            (false, false) => Ok(()),
        }
    }

    /// Playback started or resumed.
    ///
    /// Cancels a pending timer. Powers the receiver on only if it is off.
    /// Ignored while inactive.
    pub async fn play(&self) -> DeviceResult<()> {
        let mut session = self.session.lock().await;
        log::debug!("[Session] play() - {}", session.snapshot());

        if !session.active {
            return Ok(());
        }

        if let Some(action) = session.cancel_pending() {
            log::info!("[Session] Playback resumed, {:?} cancelled", action);
        }

        if session.device_on {
            return Ok(());
        }

        session.device_on = true;
        self.device.power_on().await
    }

    /// Playback paused; standby after `delay` unless playback resumes.
    ///
    /// Ignored while inactive. If a timer is already pending the first
    /// deadline stands: repeated pauses neither reset nor extend it.
    pub async fn pause(&self, delay: Duration) {
        let mut session = self.session.lock().await;
        log::debug!("[Session] pause({:?}) - {}", delay, session.snapshot());

        if !session.active || session.pending.is_some() {
            return;
        }

        let (id, cancel) = session.arm(TimerAction::Standby);
        log::info!("[Session] Standby scheduled in {}s", delay.as_secs());
        self.spawn_timer(id, delay, cancel);
    }

    /// This client stops being the active source after `delay`.
    ///
    /// Replaces any pending timer: a release is never held back by an
    /// earlier, longer pause. When it fires it behaves like
    /// `set_active(false)`. Ignored while inactive.
    pub async fn release_after(&self, delay: Duration) {
        let mut session = self.session.lock().await;
        log::debug!("[Session] release_after({:?}) - {}", delay, session.snapshot());

        if !session.active {
            return;
        }

        if let Some(action) = session.cancel_pending() {
            log::debug!("[Session] {:?} replaced by deferred release", action);
        }

        let (id, cancel) = session.arm(TimerAction::Release);
        log::info!("[Session] Release scheduled in {}s", delay.as_secs());
        self.spawn_timer(id, delay, cancel);
    }

    /// Tears the session down.
    ///
    /// Cancels any pending timer, sends standby unconditionally and
    /// releases the driver. Cleanup happens even when standby fails; the
    /// standby error is returned afterwards.
    pub async fn shutdown(&self) -> DeviceResult<()> {
        let mut session = self.session.lock().await;
        log::info!("[Session] Shutting down - {}", session.snapshot());

        session.cancel_pending();
        session.active = false;
        session.device_on = false;

        let result = self.device.standby().await;
        self.device.cleanup().await;
        result
    }

    /// Returns a copy of the current session fields.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Returns the current [`SessionState`].
    pub async fn state(&self) -> SessionState {
        self.snapshot().await.state()
    }

    fn spawn_timer(&self, id: u64, delay: Duration, cancel: CancellationToken) {
        tokio::spawn(fire_after(
            Arc::clone(&self.session),
            Arc::clone(&self.device),
            id,
            delay,
            cancel,
        ));
    }
}

/// Deactivates the session and sends standby.
async fn release(session: &mut Session, device: &dyn AudioDevice) -> DeviceResult<()> {
    session.active = false;
    session.device_on = false;
    device.standby().await
}

/// Body of a timer task.
async fn fire_after(
    session: Arc<Mutex<Session>>,
    device: Arc<dyn AudioDevice>,
    id: u64,
    delay: Duration,
    cancel: CancellationToken,
) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(delay) => {}
    }

    let mut session = session.lock().await;

    // Cancelled while waiting for the lock.
    let action = match &session.pending {
        Some(pending) if pending.id == id => pending.action,
        _ => return,
    };
    session.pending = None;

    let result = match action {
        TimerAction::Standby if session.active && session.device_on => {
            log::info!("[Session] Pause grace period elapsed, sending standby");
            session.device_on = false;
            device.standby().await
        }
        TimerAction::Standby => Ok(()),
        TimerAction::Release => {
            log::info!("[Session] Release delay elapsed, deactivating");
            release(&mut session, device.as_ref()).await
        }
    };

    if let Err(e) = result {
        log::error!("[Session] Deferred {:?} failed ({}): {}", action, e.code(), e);
    }
}
