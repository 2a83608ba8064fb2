#![deny(unsafe_code)]

//! Typed client for a running IPFS daemon's HTTP API.
//!
//! Lets a host application use the daemon as a content-addressed store
//! (`dag/put`, `dag/get`, `pin/add`), a mutable naming service (`key/gen`,
//! `name/publish`, `name/resolve`) and a publish/subscribe bus (`pubsub/pub`,
//! `pubsub/sub`). Every call goes to `<base-url>/api/v0/<endpoint>`.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌───────────┐   HTTP   ┌────────┐
//! │ IpfsClient │──▶│ Address/IPLD │──▶│ Transport │─────────▶│ daemon │
//! └────────────┘   │    codecs    │   └─────┬─────┘          └────────┘
//!                  └──────────────┘         │ failure
//!                                     ┌─────▼─────┐
//!                                     │ classify  │──▶ IpfsError
//!                                     └───────────┘
//! ```

/// Content (`/ipfs/`) and naming (`/ipns/`) addresses.
pub mod address;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Cooperative cancellation for subscriptions.
pub mod cancel;
/// The [`IpfsClient`] facade and endpoint paths.
pub mod client;
/// DAG storage and pinning.
pub mod dag;
/// Failure taxonomy and transport-failure classification.
pub mod error;
/// IPLD `{"/": cid}` link codec.
pub mod ipld;
/// IPNS keys, publishing and resolution.
pub mod name;
/// Pubsub publish and streaming subscribe.
pub mod pubsub;
/// HTTP request building and sending.
pub mod transport;

pub use address::{Address, AddressParseError, IpnsId};
pub use cancel::CancellationToken;
pub use cid::Cid;
pub use client::IpfsClient;
pub use error::IpfsError;
pub use ipld::{IpldLink, LinkError};
pub use pubsub::{JsonStreamDecoder, PubsubMessage, SubscriptionEnd};
pub use transport::Transport;
