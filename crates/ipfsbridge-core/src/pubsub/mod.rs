//! Pubsub: publish to topics and stream subscriptions.
//!
//! A subscription moves through `Idle → Streaming → Closed`:
//!
//! ```text
//! ┌──────┐ open stream ┌───────────┐ end / error / cancel ┌────────┐
//! │ Idle │────────────▶│ Streaming │─────────────────────▶│ Closed │
//! └──────┘             └─────┬─────┘                      └────────┘
//!                            │ ▲
//!                    decode  │ │ handler returns
//!                            ▼ │
//!                       ┌─────────┐
//!                       │ handler │
//!                       └─────────┘
//! ```
//!
//! Messages reach the handler one at a time, in arrival order. The
//! connection is owned by the `subscribe` future and released on every exit
//! path.

pub mod message;
pub mod stream;

pub use message::{MessageError, PubsubMessage};
pub use stream::JsonStreamDecoder;

use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::client::{IpfsClient, endpoint};
use crate::error::IpfsError;

/// How a subscription finished without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionEnd {
    /// The daemon closed the stream.
    StreamClosed,
    /// The caller's token was cancelled.
    Cancelled,
}

impl IpfsClient {
    /// Publish `data` on `topic`.
    pub async fn publish(&self, topic: &str, data: &[u8]) -> Result<(), IpfsError> {
        self.transport
            .post_multipart(endpoint::PUBSUB_PUB, &[("arg", topic)], "data", data.to_vec())
            .await?;
        debug!(topic, len = data.len(), "published pubsub message");
        Ok(())
    }

    /// Subscribe to `topic`, invoking `handler` for every message until the
    /// stream ends or `cancel` fires.
    ///
    /// A message that is valid JSON but not a valid [`PubsubMessage`] aborts
    /// the subscription with [`IpfsError::InvalidResponse`]; it is never
    /// delivered.
    pub async fn subscribe<F>(
        &self,
        topic: &str,
        cancel: &CancellationToken,
        mut handler: F,
    ) -> Result<SubscriptionEnd, IpfsError>
    where
        F: FnMut(PubsubMessage),
    {
        const ENDPOINT: &str = endpoint::PUBSUB_SUB;

        if cancel.is_cancelled() {
            return Ok(SubscriptionEnd::Cancelled);
        }

        let query = [
            ("arg", topic),
            ("encoding", "json"),
            ("stream-channels", "true"),
        ];
        let mut response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(SubscriptionEnd::Cancelled),
            opened = self.transport.open_stream(ENDPOINT, &query) => opened?,
        };
        info!(topic, "pubsub subscription open");

        let limit = self.transport.max_stream_message();
        let mut decoder = JsonStreamDecoder::with_limit(limit);
        let end = 'stream: loop {
            while let Some(value) = decoder
                .next_value()
                .map_err(|e| IpfsError::invalid_response(ENDPOINT, e))?
            {
                let message = PubsubMessage::from_wire(value).map_err(|e| {
                    warn!(topic, error = %e, "dropping subscription on undecodable message");
                    IpfsError::invalid_response(ENDPOINT, e)
                })?;
                handler(message);

                if cancel.is_cancelled() {
                    break 'stream SubscriptionEnd::Cancelled;
                }
            }

            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => break 'stream SubscriptionEnd::Cancelled,
                chunk = self.transport.next_chunk(ENDPOINT, &mut response) => chunk?,
            };

            match chunk {
                Some(bytes) => decoder.push(&bytes),
                None if decoder.is_empty() => break 'stream SubscriptionEnd::StreamClosed,
                None => {
                    return Err(IpfsError::invalid_response(
                        ENDPOINT,
                        format!(
                            "stream ended inside a message ({} bytes pending)",
                            decoder.buffered()
                        ),
                    ));
                }
            }
        };

        info!(topic, ?end, "pubsub subscription closed");
        Ok(end)
    }
}
