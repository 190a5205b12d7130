/// Errors produced by decoding bytes off the wire.
///
/// Every variant maps to the `MalformedPacket` error kind at the
/// session level; the variants exist only to make `tracing::debug!`
/// output informative about *why* a packet was rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown packet tag {0:#04x}")]
    UnknownTag(u8),

    #[error("malformed packet payload")]
    MalformedPayload,

    #[error("frame request payload must be 5 bytes, got {0}")]
    BadFrameRequestLength(usize),

    #[error("frame request quality must be nonzero")]
    ZeroQuality,

    #[error("input batch is not valid JSON")]
    InvalidJson,

    #[error("input event record has the wrong shape for its event type")]
    BadEventArity,
}
