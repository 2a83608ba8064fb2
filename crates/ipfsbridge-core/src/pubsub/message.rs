//! Pubsub message type and its wire decoding.
//!
//! On the wire the byte fields are base64 text. They are decoded eagerly: a
//! message only exists once all three decode.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::Value;

/// A message received on a pubsub topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubsubMessage {
    pub topics: Vec<String>,
    pub data: Vec<u8>,
    pub from: Vec<u8>,
    pub seqno: Vec<u8>,
}

/// Why a wire value is not a valid [`PubsubMessage`].
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("malformed pubsub message: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("pubsub field `{field}` is not valid base64: {source}")]
    Base64 {
        field: &'static str,
        source: base64::DecodeError,
    },
}

/// The JSON shape the daemon emits.
#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(rename = "topicIDs")]
    topic_ids: Vec<String>,
    data: String,
    from: String,
    seqno: String,
}

impl PubsubMessage {
    /// Decode one JSON value from the subscription stream.
    pub fn from_wire(value: Value) -> Result<Self, MessageError> {
        let wire: WireMessage = serde_json::from_value(value)?;
        Ok(Self {
            topics: wire.topic_ids,
            data: decode_field("data", &wire.data)?,
            from: decode_field("from", &wire.from)?,
            seqno: decode_field("seqno", &wire.seqno)?,
        })
    }

    /// Encode back into the daemon's wire shape.
    pub fn to_wire(&self) -> Value {
        serde_json::json!({
            "topicIDs": self.topics,
            "data": STANDARD.encode(&self.data),
            "from": STANDARD.encode(&self.from),
            "seqno": STANDARD.encode(&self.seqno),
        })
    }
}

fn decode_field(field: &'static str, text: &str) -> Result<Vec<u8>, MessageError> {
    STANDARD
        .decode(text)
        .map_err(|source| MessageError::Base64 { field, source })
}
