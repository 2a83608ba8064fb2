//! Typed client for the IPFS daemon HTTP API.
//!
//! [`IpfsClient`] is a thin facade over [`Transport`]. Each operation lives in
//! the module for its concern (`dag`, `name`, `pubsub`) as an `impl` block on
//! this type.

use ipfsbridge_config::AppConfig;
use serde::Deserialize;

use crate::error::IpfsError;
use crate::transport::{Transport, decode_json};

/// Endpoint paths, relative to `<base-url>/api/v0/`.
pub mod endpoint {
    pub const VERSION: &str = "version";
    pub const KEY_GEN: &str = "key/gen";
    pub const DAG_PUT: &str = "dag/put";
    pub const DAG_GET: &str = "dag/get";
    pub const PIN_ADD: &str = "pin/add";
    pub const NAME_PUBLISH: &str = "name/publish";
    pub const NAME_RESOLVE: &str = "name/resolve";
    pub const PUBSUB_PUB: &str = "pubsub/pub";
    pub const PUBSUB_SUB: &str = "pubsub/sub";
}

/// Client for one IPFS daemon.
///
/// Cheap to clone; clones share the underlying connection pool. Calls other
/// than `subscribe` are independent one-shot requests and may run
/// concurrently.
#[derive(Debug, Clone)]
pub struct IpfsClient {
    pub(crate) transport: Transport,
}

impl IpfsClient {
    /// Create a client from a resolved configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            transport: Transport::new(config),
        }
    }

    /// Create a client around a customised transport.
    pub fn with_transport(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Daemon version string.
    pub async fn version(&self) -> Result<String, IpfsError> {
        #[derive(Deserialize)]
        struct VersionResponse {
            #[serde(rename = "Version")]
            version: String,
        }

        let body = self.transport.get(endpoint::VERSION, &[]).await?;
        let resp: VersionResponse = decode_json(endpoint::VERSION, &body)?;
        Ok(resp.version)
    }
}
