//! IPLD link objects, `{"/": "<cid>"}`.

use cid::Cid;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Key of the single field in an IPLD link object.
pub const LINK_KEY: &str = "/";

/// Errors from decoding an IPLD link.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("invalid CID: expected an object with a \"/\" string field")]
    Shape,

    #[error("invalid CID {text:?}: {reason}")]
    Cid { text: String, reason: String },
}

/// A typed IPLD link. Serializes as `{"/": "<cid>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpldLink(pub Cid);

impl IpldLink {
    pub fn cid(&self) -> Cid {
        self.0
    }
}

impl From<Cid> for IpldLink {
    fn from(cid: Cid) -> Self {
        Self(cid)
    }
}

/// Encode a CID as a link object.
pub fn encode(cid: &Cid) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(LINK_KEY.to_string(), Value::String(cid.to_string()));
    Value::Object(map)
}

/// Decode a link object back into its CID.
pub fn decode(value: &Value) -> Result<Cid, LinkError> {
    let text = value
        .as_object()
        .and_then(|obj| obj.get(LINK_KEY))
        .and_then(Value::as_str)
        .ok_or(LinkError::Shape)?;
    Cid::try_from(text).map_err(|e| LinkError::Cid {
        text: text.to_string(),
        reason: e.to_string(),
    })
}

impl Serialize for IpldLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(LINK_KEY, &self.0.to_string())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for IpldLink {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode(&value).map(IpldLink).map_err(serde::de::Error::custom)
    }
}
