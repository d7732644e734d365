//! REST polling event source.
//!
//! Each call to [`next_batch`](NotificationSource::next_batch) issues one GET
//! against the configured URL. Feeds that long-poll simply hold the request
//! open until something happens; the optional request timeout bounds that.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{decode_events, EventFormat, Notification, NotificationSource};
use crate::config::EventSourceConfig;
use crate::error::{EventError, EventResult};
use crate::protocol_constants::REST_SUCCESS_CODE;

/// Event source polling a JSON endpoint over HTTP.
pub struct RestEventSource {
    client: Client,
    url: String,
    format: EventFormat,
}

impl RestEventSource {
    /// Creates a source from the event configuration.
    ///
    /// # Errors
    /// Returns `EventError::Http` if the HTTP client cannot be built.
    pub fn new(config: &EventSourceConfig) -> EventResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            url: config.rest_url.clone(),
            format: config.format(),
        })
    }

    /// The polled URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationSource for RestEventSource {
    async fn next_batch(&self) -> EventResult<Vec<Notification>> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status().as_u16();
        if status != REST_SUCCESS_CODE {
            return Err(EventError::HttpStatus(status));
        }

        let json: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                EventError::Malformed(format!("invalid JSON from {}: {}", self.url, e))
            } else {
                EventError::Http(e)
            }
        })?;

        let notifications = decode_events(&json, &self.format)?;
        log::debug!(
            "[Events] {} notification(s) from {}",
            notifications.len(),
            self.url
        );
        Ok(notifications)
    }
}
