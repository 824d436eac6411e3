use chrono::{DateTime, Utc};
use notification_broker::Payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Display title used when an event carries none
pub const DEFAULT_TITLE: &str = "New Notification";

/// Display message used when an event carries none
pub const DEFAULT_MESSAGE: &str = "You have a new notification";

/// Session-local notification id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NotificationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Client-side notification record
///
/// `read` never leaves the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    /// Receipt time, display only
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::generate(),
            title: title.into(),
            message: message.into(),
            created_at: Utc::now(),
            read: false,
        }
    }

    /// Build a record from a `new-notification` payload.
    ///
    /// Never fails: missing, empty or non-string `title`/`message` fall back to the
    /// default display text. An `id` in the payload is kept, otherwise one is generated.
    pub fn from_payload(payload: &Payload) -> Self {
        let id = payload_id(payload).unwrap_or_else(NotificationId::generate);

        Self {
            id,
            title: display_text(payload, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            message: display_text(payload, "message")
                .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            created_at: Utc::now(),
            read: false,
        }
    }
}

fn display_text(payload: &Payload, key: &str) -> Option<String> {
    match payload.get(key) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => None,
        Some(other) => {
            debug!(field = key, value = %other, "Non-string display field, using default");
            None
        }
    }
}

fn payload_id(payload: &Payload) -> Option<NotificationId> {
    match payload.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Some(NotificationId(id.clone())),
        Some(Value::Number(id)) => Some(NotificationId(id.to_string())),
        _ => None,
    }
}
