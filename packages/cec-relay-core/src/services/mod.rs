//! Services that turn notifications into receiver power commands.

pub mod event_loop;
pub mod router;
pub mod session_coordinator;

pub use event_loop::{run_event_loop, PollTiming};
pub use router::{DispatchPolicy, NotificationRouter};
pub use session_coordinator::{SessionCoordinator, SessionSnapshot, SessionState};
