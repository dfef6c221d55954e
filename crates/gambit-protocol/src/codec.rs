//! Codec trait and the JSON implementation.
//!
//! A codec converts wire events to frame bytes and back. The server loop
//! is written against [`Codec`], so a binary format can be swapped in
//! without touching the relay.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one frame.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes one frame back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Browser clients read these frames directly, so this is the default.
///
/// ```rust
/// use gambit_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let frame = br#"{"event":"resign_game","data":{"gameId":"game-1-1"}}"#;
///
/// let event: ClientEvent = codec.decode(frame).unwrap();
/// let bytes = codec.encode(&event).unwrap();
/// let again: ClientEvent = codec.decode(&bytes).unwrap();
/// assert_eq!(event, again);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientEvent, ErrorCode, ServerEvent};

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<ClientEvent, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_server_event_is_utf8_json() {
        let bytes = JsonCodec
            .encode(&ServerEvent::error(ErrorCode::NotYourTurn))
            .unwrap();
        let text = std::str::from_utf8(&bytes).expect("json is utf-8");
        assert!(text.contains(r#""event":"error""#));
        assert!(text.contains("Not your turn"));
    }
}
