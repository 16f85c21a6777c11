//! Outbound webhook notification sink
//!
//! Forwards each notification as a JSON POST to a configured endpoint.
//! Fire-and-forget: errors are logged but never block the caller. The
//! receiver deduplicates on (kind, request_id, recipient) using the stable
//! metadata in the payload.

use super::types::{Notification, NotificationSink};
use std::time::Duration;
use tracing::warn;

/// HTTP sink that POSTs notifications to an external webhook.
#[derive(Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    /// Create a new WebhookSink targeting the given endpoint URL.
    pub fn new(url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to create reqwest client");

        Self {
            client,
            url: url.trim_end_matches('/').to_string(),
        }
    }
}

impl NotificationSink for WebhookSink {
    fn deliver(&self, notification: &Notification) {
        let client = self.client.clone();
        let url = self.url.clone();
        let payload = serde_json::json!({
            "recipient": notification.recipient,
            "type": notification.kind,
            "title": notification.title,
            "message": notification.message,
            "metadata": {
                "request_id": notification.request_id,
            },
        });

        let kind = notification.kind;
        tokio::spawn(async move {
            if let Err(e) = client.post(&url).json(&payload).send().await {
                warn!(
                    url = %url,
                    kind = %kind,
                    "Failed to deliver notification webhook: {}",
                    e
                );
            }
        });
    }
}
