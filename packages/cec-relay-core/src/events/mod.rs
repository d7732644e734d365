//! Playback notifications and the feeds that produce them.
//!
//! A feed delivers JSON shaped like
//!
//! ```json
//! { "events": [ { "notification": 2 }, { "notification": 0 } ] }
//! ```
//!
//! where both keys and every integer code are configurable through
//! [`EventFormat`]. Decoding failures stay in this module as
//! [`EventError`]; only well-formed [`Notification`]s leave it.

mod rest;

use async_trait::async_trait;
use serde_json::Value;

pub use rest::RestEventSource;

use crate::config::NotificationCodes;
use crate::error::{EventError, EventResult};

/// A decoded playback notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Stop,
    Play,
    Pause,
    ActiveDevice,
    InactiveDevice,
    /// Code present but not mapped to any known notification.
    Unknown(i64),
}

/// JSON layout of the event feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFormat {
    /// Top-level key holding the array of events.
    pub events_key: String,
    /// Key inside each event holding the notification code.
    pub notification_key: String,
    /// Code mapping.
    pub codes: NotificationCodes,
}

impl EventFormat {
    /// Maps a raw code to a [`Notification`].
    ///
    /// Codes are checked in a fixed order, so if a feed reuses one code for
    /// two notifications the first match wins.
    #[must_use]
    pub fn classify(&self, code: i64) -> Notification {
        let codes = &self.codes;
        let table = [
            (codes.active_device, Notification::ActiveDevice),
            (codes.inactive_device, Notification::InactiveDevice),
            (codes.play, Notification::Play),
            (codes.stop, Notification::Stop),
            (codes.pause, Notification::Pause),
        ];

        table
            .into_iter()
            .find(|(configured, _)| *configured == Some(code))
            .map_or(Notification::Unknown(code), |(_, notification)| notification)
    }
}

/// Decodes one feed response into notifications, preserving order.
///
/// Events without the notification key are skipped. A notification value
/// that is not an integer decodes as `Unknown(-1)`.
///
/// # Errors
/// `EventError::Malformed` if the response is not an object holding an
/// array under `events_key`, or if an array element is not an object.
pub fn decode_events(json: &Value, format: &EventFormat) -> EventResult<Vec<Notification>> {
    let events = json
        .get(&format.events_key)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            EventError::Malformed(format!("missing '{}' array", format.events_key))
        })?;

    let mut notifications = Vec::with_capacity(events.len());
    for event in events {
        let event = event
            .as_object()
            .ok_or_else(|| EventError::Malformed("event is not an object".to_string()))?;

        let Some(value) = event.get(&format.notification_key) else {
            continue;
        };

        let notification = match value.as_i64() {
            Some(code) => format.classify(code),
            None => {
                log::debug!("[Events] Non-integer notification value: {}", value);
                Notification::Unknown(-1)
            }
        };
        notifications.push(notification);
    }

    Ok(notifications)
}

/// Trait for anything producing batches of notifications.
///
/// Used by the event loop so tests can script a feed.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Waits for and returns the next batch of notifications.
    async fn next_batch(&self) -> EventResult<Vec<Notification>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn format() -> EventFormat {
        EventFormat {
            events_key: "Events".to_string(),
            notification_key: "Notification".to_string(),
            codes: NotificationCodes {
                stop: Some(0),
                play: Some(1),
                pause: Some(2),
                active_device: Some(3),
                inactive_device: Some(4),
            },
        }
    }

    #[test]
    fn decodes_all_codes_in_order() {
        let json = json!({
            "Events": [
                { "Notification": 3 },
                { "Notification": 1 },
                { "Notification": 2 },
                { "Notification": 0 },
                { "Notification": 4 },
                { "Notification": 9 },
            ]
        });

        let notifications = decode_events(&json, &format()).unwrap();
        assert_eq!(
            notifications,
            vec![
                Notification::ActiveDevice,
                Notification::Play,
                Notification::Pause,
                Notification::Stop,
                Notification::InactiveDevice,
                Notification::Unknown(9),
            ]
        );
    }

    #[test]
    fn skips_events_without_notification_key() {
        let json = json!({
            "Events": [ { "Volume": 20 }, { "Notification": 1, "Extra": true } ]
        });

        assert_eq!(decode_events(&json, &format()).unwrap(), vec![Notification::Play]);
    }

    #[test]
    fn empty_event_list_is_ok() {
        let json = json!({ "Events": [] });
        assert!(decode_events(&json, &format()).unwrap().is_empty());
    }

    #[test]
    fn missing_events_key_is_malformed() {
        let err = decode_events(&json!({ "Other": [] }), &format()).unwrap_err();
        assert!(matches!(err, EventError::Malformed(_)));

        let err = decode_events(&json!({ "Events": 5 }), &format()).unwrap_err();
        assert!(matches!(err, EventError::Malformed(_)));

        let err = decode_events(&json!([1, 2]), &format()).unwrap_err();
        assert!(matches!(err, EventError::Malformed(_)));
    }

    #[test]
    fn non_object_event_is_malformed() {
        let err = decode_events(&json!({ "Events": [1] }), &format()).unwrap_err();
        assert!(matches!(err, EventError::Malformed(_)));
    }

    #[test]
    fn non_integer_value_is_unknown() {
        let json = json!({ "Events": [ { "Notification": "play" } ] });
        assert_eq!(
            decode_events(&json, &format()).unwrap(),
            vec![Notification::Unknown(-1)]
        );
    }

    #[test]
    fn unset_codes_never_match() {
        let format = EventFormat {
            codes: NotificationCodes {
                play: Some(1),
                ..Default::default()
            },
            ..format()
        };
        assert_eq!(format.classify(1), Notification::Play);
        assert_eq!(format.classify(0), Notification::Unknown(0));
        assert_eq!(format.classify(-1), Notification::Unknown(-1));
    }
}
