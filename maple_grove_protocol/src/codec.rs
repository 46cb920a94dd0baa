// Datagram codec — envelopes to bounded byte buffers and back.
//
// Encoding is JSON: the protocol favors a human-inspectable text format over
// a compact binary one, and nothing here is bandwidth-bound (small local
// peer sets, ~1 KB datagrams). The size bound is enforced on both paths; an
// envelope that serializes past it is rejected whole, never truncated.
//
// Both error types are recoverable by design: a failed decode means "discard
// this datagram and keep receiving", never "tear down the session". Nothing
// a remote peer puts on the wire can make `decode` panic.

use crate::message::Envelope;

/// Maximum datagram payload size in bytes.
pub const MAX_DATAGRAM_SIZE: usize = 1024;

/// Envelope could not be turned into a datagram.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Serialized form exceeds [`MAX_DATAGRAM_SIZE`]. Policy is
    /// reject-and-drop: the caller loses the message, the stream stays valid.
    #[error("envelope too large: {len} bytes (max {MAX_DATAGRAM_SIZE})")]
    TooLarge { len: usize },
}

/// Datagram could not be turned back into an envelope.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("datagram too large: {len} bytes (max {MAX_DATAGRAM_SIZE})")]
    TooLarge { len: usize },
    /// Malformed JSON, a truncated payload, or an unknown type tag.
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Encode an envelope into a single datagram payload.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, EncodeError> {
    let bytes = serde_json::to_vec(envelope)?;
    if bytes.len() > MAX_DATAGRAM_SIZE {
        return Err(EncodeError::TooLarge { len: bytes.len() });
    }
    Ok(bytes)
}

/// Decode one datagram payload into an envelope.
pub fn decode(bytes: &[u8]) -> Result<Envelope, DecodeError> {
    if bytes.len() > MAX_DATAGRAM_SIZE {
        return Err(DecodeError::TooLarge { len: bytes.len() });
    }
    Ok(serde_json::from_slice(bytes)?)
}
