//! Failure taxonomy for daemon calls.
//!
//! Every transport failure is first captured as a [`TransportFailure`] and
//! then classified into exactly one [`IpfsError`] kind by [`classify`]. The
//! classification order is fixed: a structured daemon message wins over a
//! timeout, which wins over a refused connection, which wins over anything
//! else.

use bytes::Bytes;
use serde_json::Value;

use crate::address::Address;

/// Field of a daemon error body carrying the human-readable message.
const MESSAGE_FIELD: &str = "Message";

/// Errors from IPFS daemon calls.
#[derive(Debug, thiserror::Error)]
pub enum IpfsError {
    /// The daemon answered with a structured error; the message is verbatim.
    #[error("{0}")]
    Daemon(String),

    #[error("request to {0} timed out")]
    Timeout(String),

    #[error("cannot connect to the IPFS daemon")]
    NoDaemon,

    #[error("daemon request to {endpoint} failed: {detail}")]
    Unclassified { endpoint: String, detail: String },

    #[error("invalid response from {endpoint}: {detail}")]
    InvalidResponse { endpoint: String, detail: String },

    #[error("failed to decode IPLD node at {address}: {detail}")]
    IpldParse { address: Address, detail: String },
}

impl IpfsError {
    pub(crate) fn invalid_response(endpoint: &str, detail: impl ToString) -> Self {
        IpfsError::InvalidResponse {
            endpoint: endpoint.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// A raw failure observed by the transport, before classification.
#[derive(Debug, Clone)]
pub enum TransportFailure {
    /// The daemon answered with a non-success status.
    Status { status: u16, body: Bytes },
    /// The response did not arrive within the deadline.
    Timeout,
    /// The connection could not be established.
    Connect(String),
    /// Anything else (protocol errors, truncated bodies, ...).
    Other(String),
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportFailure::Timeout
        } else if err.is_connect() {
            TransportFailure::Connect(err.to_string())
        } else {
            TransportFailure::Other(err.to_string())
        }
    }
}

/// Map a transport failure on `endpoint` to its error kind.
pub fn classify(endpoint: &str, failure: TransportFailure) -> IpfsError {
    if let TransportFailure::Status { body, .. } = &failure {
        if let Some(message) = daemon_message(body) {
            return IpfsError::Daemon(message);
        }
    }

    match failure {
        TransportFailure::Timeout => IpfsError::Timeout(endpoint.to_string()),
        TransportFailure::Connect(_) => IpfsError::NoDaemon,
        TransportFailure::Status { status, .. } => IpfsError::Unclassified {
            endpoint: endpoint.to_string(),
            detail: format!("unexpected status {status}"),
        },
        TransportFailure::Other(detail) => IpfsError::Unclassified {
            endpoint: endpoint.to_string(),
            detail,
        },
    }
}

/// The top-level `"Message"` string of a JSON error body, if present.
pub fn daemon_message(body: &[u8]) -> Option<String> {
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Object(mut obj) => match obj.remove(MESSAGE_FIELD)? {
            Value::String(message) => Some(message),
            _ => None,
        },
        _ => None,
    }
}
