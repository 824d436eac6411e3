use chrono::{DateTime, Utc};
use notification_broker::Payload;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Acknowledgment returned for every accepted send request
pub const NOTIFICATION_SENT: &str = "Notification sent successfully";

/// Opaque recipient reference (`user_id` on the wire)
///
/// Persisted alongside the notification but never interpreted: every notification is
/// broadcast on the single global channel regardless of its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientSelector(pub Value);

/// Body of `POST /api/notifications/send`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendNotificationRequest {
    #[serde(default, deserialize_with = "coerce_optional_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "coerce_optional_string")]
    pub message: Option<String>,

    #[serde(default)]
    pub user_id: Option<RecipientSelector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendNotificationResponse {
    pub message: String,
}

impl SendNotificationResponse {
    pub fn sent() -> Self {
        Self {
            message: NOTIFICATION_SENT.to_string(),
        }
    }
}

/// Fields handed to the store's `create`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNotification {
    pub title: Option<String>,
    pub message: Option<String>,
    pub user_id: Option<RecipientSelector>,
}

impl From<SendNotificationRequest> for NewNotification {
    fn from(req: SendNotificationRequest) -> Self {
        Self {
            title: req.title,
            message: req.message,
            user_id: req.user_id,
        }
    }
}

/// Persisted notification record
///
/// `title`/`message` are stored as received; display defaults are the receiver's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: Option<String>,
    pub message: Option<String>,
    pub user_id: Option<RecipientSelector>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build a record with a fresh server-assigned id
    pub fn create(fields: NewNotification) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            message: fields.message,
            user_id: fields.user_id,
            created_at: Utc::now(),
        }
    }

    /// Payload of the `new-notification` event. Absent fields are left out.
    ///
    /// The server id is deliberately not included; clients assign their own.
    pub fn broadcast_payload(&self) -> Payload {
        let mut payload = Payload::new();
        if let Some(title) = &self.title {
            payload.insert("title".to_string(), Value::String(title.clone()));
        }
        if let Some(message) = &self.message {
            payload.insert("message".to_string(), Value::String(message.clone()));
        }
        payload
    }
}

/// Accept strings, numbers and booleans; `null` means absent
fn coerce_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
        _ => "a scalar",
    }
}
