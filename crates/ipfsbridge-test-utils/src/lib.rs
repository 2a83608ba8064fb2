#![deny(unsafe_code)]

//! Shared test utilities for the ipfsbridge workspace.
//!
//! Provides a scriptable fake IPFS daemon, config builders, and tracing
//! helpers so that individual crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! ipfsbridge-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod fake_daemon;
pub mod tracing_setup;

pub use config::TestConfigBuilder;
pub use fake_daemon::{CannedResponse, FakeDaemon, RecordedRequest};
