//! Content-addressed DAG storage and pinning.

use cid::Cid;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::address::Address;
use crate::client::{IpfsClient, endpoint};
use crate::error::IpfsError;
use crate::ipld::IpldLink;
use crate::transport::decode_json;

#[derive(Debug, Deserialize)]
struct DagPutResponse {
    #[serde(rename = "Cid")]
    cid: IpldLink,
}

#[derive(Debug, Deserialize)]
struct PinAddResponse {
    #[serde(rename = "Pins")]
    pins: Vec<String>,
}

impl IpfsClient {
    /// Store a JSON node and pin it in the same call.
    pub async fn dag_put(&self, value: &Value) -> Result<Cid, IpfsError> {
        let body = value.to_string().into_bytes();
        let resp = self
            .transport
            .post_multipart(endpoint::DAG_PUT, &[("pin", "true")], "arg", body)
            .await?;
        let resp: DagPutResponse = decode_json(endpoint::DAG_PUT, &resp)?;
        debug!(cid = %resp.cid.0, "stored DAG node");
        Ok(resp.cid.cid())
    }

    /// Fetch a DAG node and decode it into `T`.
    ///
    /// A body that is not JSON is an [`IpfsError::InvalidResponse`]; JSON that
    /// does not fit `T` is an [`IpfsError::IpldParse`] carrying `address`.
    pub async fn dag_get<T: DeserializeOwned>(&self, address: &Address) -> Result<T, IpfsError> {
        let arg = address.to_string();
        let body = self
            .transport
            .get(endpoint::DAG_GET, &[("arg", arg.as_str())])
            .await?;
        let value: Value = decode_json(endpoint::DAG_GET, &body)?;
        decode_node(address, value)
    }

    /// Pin the content behind `address`, returning every newly pinned CID.
    pub async fn pin_add(&self, address: &Address) -> Result<Vec<Cid>, IpfsError> {
        let arg = address.to_string();
        let body = self
            .transport
            .get(endpoint::PIN_ADD, &[("arg", arg.as_str())])
            .await?;
        let resp: PinAddResponse = decode_json(endpoint::PIN_ADD, &body)?;
        resp.pins
            .iter()
            .map(|text| {
                Cid::try_from(text.as_str()).map_err(|e| {
                    IpfsError::invalid_response(endpoint::PIN_ADD, format!("invalid CID {text:?}: {e}"))
                })
            })
            .collect()
    }
}

/// Convert a well-formed JSON node into the caller's type.
pub(crate) fn decode_node<T: DeserializeOwned>(address: &Address, value: Value) -> Result<T, IpfsError> {
    serde_json::from_value(value).map_err(|e| IpfsError::IpldParse {
        address: address.clone(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Profile {
        name: String,
        age: u32,
    }

    #[test]
    fn test_decode_node_success() {
        let address = Address::parse("/ipns/self").unwrap();
        let profile: Profile = decode_node(&address, json!({"name": "ada", "age": 36})).unwrap();
        assert_eq!(
            profile,
            Profile {
                name: "ada".to_string(),
                age: 36
            }
        );
    }

    #[test]
    fn test_decode_node_mismatch_carries_address() {
        let address = Address::parse("/ipns/self").unwrap();
        let err = decode_node::<Profile>(&address, json!({"name": "ada"})).unwrap_err();
        match err {
            IpfsError::IpldParse { address: a, detail } => {
                assert_eq!(a, address);
                assert!(detail.contains("age"), "detail was {detail}");
            }
            other => panic!("expected IpldParse, got {other:?}"),
        }
    }

    #[test]
    fn test_dag_put_response_shape() {
        let resp: DagPutResponse = serde_json::from_str(
            r#"{"Cid":{"/":"bafyreigbtj4x7ip5legnfznufuopl4sg4knzc2cof6duas4b3q2fy6swua"}}"#,
        )
        .unwrap();
        assert_eq!(
            resp.cid.0.to_string(),
            "bafyreigbtj4x7ip5legnfznufuopl4sg4knzc2cof6duas4b3q2fy6swua"
        );

        assert!(serde_json::from_str::<DagPutResponse>(r#"{"Cid":{"/":"nope"}}"#).is_err());
        assert!(serde_json::from_str::<DagPutResponse>(r#"{}"#).is_err());
    }
}
