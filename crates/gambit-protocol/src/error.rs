//! Error types for the protocol layer.

/// Errors that can occur while turning events into frames and back.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `event` name, or
    /// a payload missing required fields.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
