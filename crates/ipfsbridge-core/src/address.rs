//! Content and naming addresses.
//!
//! An [`Address`] is either an immutable content address (`/ipfs/<cid>`) or a
//! mutable naming address (`/ipns/<id>`). The canonical text form is the only
//! representation exchanged with the daemon.

use std::fmt;
use std::str::FromStr;

use cid::Cid;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const IPFS_PREFIX: &str = "/ipfs/";
const IPNS_PREFIX: &str = "/ipns/";

/// Opaque identifier of a mutable name (an IPNS key id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpnsId(String);

impl IpnsId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IpnsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for IpnsId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for IpnsId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A content-addressed or name-addressed location on the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// Immutable content, `/ipfs/<cid>`.
    Ipfs(Cid),
    /// Mutable name, `/ipns/<id>`.
    Ipns(IpnsId),
}

impl Address {
    /// Parse the canonical text form.
    ///
    /// The content prefix is tried first. A `/ipfs/` path with a malformed
    /// CID yields `None` rather than falling back to the naming scheme.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(rest) = s.strip_prefix(IPFS_PREFIX) {
            return Cid::try_from(rest).ok().map(Address::Ipfs);
        }
        s.strip_prefix(IPNS_PREFIX)
            .filter(|rest| !rest.is_empty())
            .map(|rest| Address::Ipns(IpnsId::new(rest)))
    }

    /// The CID of a content address.
    pub fn as_cid(&self) -> Option<&Cid> {
        match self {
            Address::Ipfs(cid) => Some(cid),
            Address::Ipns(_) => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Ipfs(cid) => write!(f, "{IPFS_PREFIX}{cid}"),
            Address::Ipns(id) => write!(f, "{IPNS_PREFIX}{id}"),
        }
    }
}

impl From<Cid> for Address {
    fn from(cid: Cid) -> Self {
        Address::Ipfs(cid)
    }
}

impl From<IpnsId> for Address {
    fn from(id: IpnsId) -> Self {
        Address::Ipns(id)
    }
}

/// Text that is neither a valid `/ipfs/` nor `/ipns/` path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address: {0:?}")]
pub struct AddressParseError(pub String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s).ok_or_else(|| AddressParseError(s.to_string()))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
