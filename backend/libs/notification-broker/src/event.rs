use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// String-keyed event payload
pub type Payload = serde_json::Map<String, Value>;

/// An event delivered to a subscription
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerEvent {
    pub channel: String,
    pub event: String,
    pub data: Payload,
}

/// Wire envelope used on transports that carry a single body per channel message
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    event: String,
    #[serde(default)]
    data: T,
}

impl BrokerEvent {
    pub fn new(channel: impl Into<String>, event: impl Into<String>, data: Payload) -> Self {
        Self {
            channel: channel.into(),
            event: event.into(),
            data,
        }
    }

    /// Encode as `{"event": .., "data": {..}}`
    pub fn to_envelope(event: &str, data: &Payload) -> serde_json::Result<String> {
        serde_json::to_string(&Envelope {
            event: event.to_string(),
            data,
        })
    }

    /// Decode an envelope received on `channel`.
    ///
    /// A missing or non-object `data` field decodes to an empty payload; receivers apply
    /// their own defaults for absent fields.
    pub fn from_envelope(channel: &str, body: &str) -> serde_json::Result<Self> {
        let envelope: Envelope<Value> = serde_json::from_str(body)?;
        let data = match envelope.data {
            Value::Object(map) => map,
            Value::Null => Payload::new(),
            other => {
                debug!(channel = %channel, event = %envelope.event, data = %other, "Non-object event data, using empty payload");
                Payload::new()
            }
        };

        Ok(Self::new(channel, envelope.event, data))
    }
}
