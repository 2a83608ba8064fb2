//! Cooperative cancellation for long-running daemon calls.
//!
//! A [`CancellationToken`] is owned by the caller and handed to
//! [`IpfsClient::subscribe`](crate::IpfsClient::subscribe). The subscription
//! checks it between message deliveries and races it against every blocking
//! read, so cancelling takes effect without waiting for the daemon.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable cancellation signal.
///
/// When `cancel()` is called on any clone, all clones observe the cancellation.
///
/// # Example
///
/// ```
/// use ipfsbridge_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
///
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Create a new, un-cancelled token.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// A token sharing cancellation state with this one.
    pub fn child_token(&self) -> Self {
        self.clone()
    }

    /// Resolve once the token is cancelled.
    ///
    /// Returns immediately if cancellation was already requested.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so `wait_for` cannot observe a closed channel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
