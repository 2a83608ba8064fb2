//! Mutable naming: key generation, IPNS publish and resolve.

use cid::Cid;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::address::{Address, IpnsId};
use crate::client::{IpfsClient, endpoint};
use crate::error::IpfsError;
use crate::transport::decode_json;

#[derive(Debug, Deserialize)]
struct KeyGenResponse {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct NameResolveResponse {
    #[serde(rename = "Path")]
    path: String,
}

impl IpfsClient {
    /// Generate a new ed25519 naming key called `name`.
    pub async fn key_gen(&self, name: &str) -> Result<IpnsId, IpfsError> {
        let body = self
            .transport
            .get(endpoint::KEY_GEN, &[("arg", name), ("type", "ed25519")])
            .await?;
        let resp: KeyGenResponse = decode_json(endpoint::KEY_GEN, &body)?;
        debug!(name, id = %resp.id, "generated naming key");
        Ok(IpnsId::new(resp.id))
    }

    /// Point the name owned by `key` at `address`.
    pub async fn name_publish(&self, key: &IpnsId, address: &Address) -> Result<(), IpfsError> {
        let arg = address.to_string();
        let body = self
            .transport
            .get(
                endpoint::NAME_PUBLISH,
                &[("arg", arg.as_str()), ("key", key.as_str())],
            )
            .await?;
        let _: Value = decode_json(endpoint::NAME_PUBLISH, &body)?;
        debug!(key = %key, target = %address, "published name");
        Ok(())
    }

    /// Follow `name` through any IPNS chain down to a content CID.
    pub async fn name_resolve(&self, name: &IpnsId) -> Result<Cid, IpfsError> {
        let body = self
            .transport
            .get(
                endpoint::NAME_RESOLVE,
                &[("arg", name.as_str()), ("recursive", "true")],
            )
            .await?;
        let resp: NameResolveResponse = decode_json(endpoint::NAME_RESOLVE, &body)?;
        resolved_cid(&resp.path)
    }
}

/// The CID of a fully resolved `/ipfs/` path.
fn resolved_cid(path: &str) -> Result<Cid, IpfsError> {
    match Address::parse(path) {
        Some(Address::Ipfs(cid)) => Ok(cid),
        Some(Address::Ipns(_)) => Err(IpfsError::invalid_response(
            endpoint::NAME_RESOLVE,
            format!("expected /ipfs path, got {path:?}"),
        )),
        None => Err(IpfsError::invalid_response(
            endpoint::NAME_RESOLVE,
            format!("invalid path {path:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CID_V1: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

    #[test]
    fn test_resolved_cid_accepts_ipfs_path() {
        let cid = resolved_cid(&format!("/ipfs/{CID_V1}")).unwrap();
        assert_eq!(cid.to_string(), CID_V1);
    }

    #[test]
    fn test_resolved_cid_rejects_ipns_path() {
        let err = resolved_cid("/ipns/k51qzi5uqu5d").unwrap_err();
        assert!(
            matches!(err, IpfsError::InvalidResponse { ref detail, .. } if detail.contains("expected /ipfs path"))
        );
    }

    #[test]
    fn test_resolved_cid_rejects_garbage() {
        for path in ["", "/ipfs/zzz", "bafy", "/foo/bar"] {
            let err = resolved_cid(path).unwrap_err();
            assert!(
                matches!(err, IpfsError::InvalidResponse { ref detail, .. } if detail.contains("invalid path")),
                "path {path:?} gave {err:?}"
            );
        }
    }
}
