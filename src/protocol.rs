//! Reply-channel sentinels and message classification.

/// Sentinel body signaling "request accepted, final response forthcoming".
pub const ACK: &[u8] = b"\x01";

/// Sentinel body signaling "request declined, try again later".
pub const NACK: &[u8] = b"\x02";

/// Resolved result of one dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Raw response payload from the server.
    Payload(Vec<u8>),
    /// The server declined the request.
    Nack,
}

impl Reply {
    /// Returns `true` for [`Reply::Nack`].
    pub fn is_nack(&self) -> bool {
        matches!(self, Reply::Nack)
    }

    /// Returns the response payload, if any.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Reply::Payload(body) => Some(body),
            Reply::Nack => None,
        }
    }
}

/// Content-based classification of one inbox message.
///
/// The protocol reserves the two marker bodies; everything else on the
/// reply channel is the final response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Signal {
    Ack,
    Nack,
    Response,
}

pub(crate) fn classify(body: &[u8]) -> Signal {
    if body == ACK {
        Signal::Ack
    } else if body == NACK {
        Signal::Nack
    } else {
        Signal::Response
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, Reply, Signal, ACK, NACK};

    #[test]
    fn markers_classify_as_signals() {
        assert_eq!(classify(ACK), Signal::Ack);
        assert_eq!(classify(NACK), Signal::Nack);
    }

    #[test]
    fn any_other_body_is_a_response() {
        assert_eq!(classify(b"final count down"), Signal::Response);
        assert_eq!(classify(b""), Signal::Response);
        assert_eq!(classify(b"\x01\x02"), Signal::Response);
    }

    #[test]
    fn reply_accessors() {
        let payload = Reply::Payload(b"ok".to_vec());
        assert!(!payload.is_nack());
        assert_eq!(payload.payload(), Some(&b"ok"[..]));

        assert!(Reply::Nack.is_nack());
        assert_eq!(Reply::Nack.payload(), None);
    }
}
