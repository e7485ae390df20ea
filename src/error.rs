use crate::TransportError;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No ack or final response arrived within budget, or a retry budget
    /// was exhausted.
    #[error("timed out waiting for a reply from the broker")]
    Timeout,
    /// Failure reported by the broker connection.
    ///
    /// When the connection was reconnecting for every retry, the value
    /// carried here is the original transport failure, so callers can
    /// tell "broker unreachable" apart from "request not served".
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
