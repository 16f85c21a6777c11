//! Notification model and delivery trait

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A worker submitted a status request — sent to tenant administrators.
    StatusRequestSubmitted,
    /// An administrator decided a request — sent back to the requester.
    StatusRequestDecided,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::StatusRequestSubmitted => "status_request_submitted",
            NotificationKind::StatusRequestDecided => "status_request_decided",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted in-app notification. Unique per (kind, request, recipient):
/// a retried delivery attempt for the same request/recipient never creates
/// a duplicate row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Stable metadata key enabling idempotent delivery downstream.
    pub request_id: Uuid,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        request_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            request_id,
            acknowledged: false,
            created_at: Utc::now(),
        }
    }

    /// Uniqueness key: one notification per (kind, request, recipient).
    pub fn dedup_key(&self) -> String {
        format!("{}:{}:{}", self.kind, self.request_id, self.recipient)
    }
}

/// Outbound delivery of a notification to an external channel.
///
/// Fire-and-forget: implementations must never block the caller and never
/// surface failures beyond a warning log. Idempotency per
/// (kind, request id, recipient) is the receiver's contract; the stable
/// `request_id` in the payload enables it.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification);
}
