//! Broker connection seam.
//!
//! The client does not speak a broker wire protocol itself. It drives an
//! already-established connection through [`Transport`], leaving connection
//! lifecycle (reconnects, draining) to the implementation.

use async_trait::async_trait;

/// Failure modes a [`Transport`] may report.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection is re-establishing itself and cannot accept
    /// publishes right now. The client retries this after waiting the
    /// configured reconnect delay.
    #[error("broker connection is reconnecting")]
    Reconnecting,
    /// The reply subscription closed before a message arrived.
    #[error("reply subscription closed")]
    SubscriptionClosed,
    /// Any other connection-level failure. Not retried.
    #[error("{0}")]
    Other(String),
}

/// Handle to a pub/sub broker connection.
///
/// Publishing is an at-most-once delivery attempt; reliability on top of it
/// is the client's retry loop, not the transport's concern.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Validates the connection, lazily establishing it if needed.
    ///
    /// Invoked once at the start of every dispatch attempt.
    async fn ensure_connected(&self) -> Result<(), TransportError>;

    /// Publishes `payload` on `subject`, with `reply_to` as the return
    /// address for ack and response signals.
    async fn publish(
        &self,
        subject: &str,
        payload: &[u8],
        reply_to: &str,
    ) -> Result<(), TransportError>;

    /// Opens a subscription yielding message bodies delivered on `subject`.
    ///
    /// Dropping the returned handle tears the subscription down.
    async fn subscribe(&self, subject: &str) -> Result<Box<dyn Subscription>, TransportError>;

    /// Mints a unique reply subject scoped to one call.
    fn new_inbox(&self) -> String;
}

/// Receiving half of an ephemeral subscription.
#[async_trait]
pub trait Subscription: Send {
    /// Waits for the next message body. Returns `None` once the
    /// subscription has been closed by the transport.
    async fn next(&mut self) -> Option<Vec<u8>>;
}
