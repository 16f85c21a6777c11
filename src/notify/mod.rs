//! Notifications: persisted in-app rows plus fire-and-forget outbound sinks

pub mod types;
pub mod webhook;

pub use types::{Notification, NotificationKind, NotificationSink};
pub use webhook::WebhookSink;
