//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The room layer hands typed events to the collaborator; whoever owns the
//! socket picks a [`Codec`] to turn them into bytes. Currently we provide
//! [`JsonCodec`], which is what browser clients speak.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so a single codec can be shared by every
/// connection task of a server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use lycan_protocol::{Codec, JsonCodec, PlayerId, Recipient};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Recipient::Player(PlayerId(7))).unwrap();
/// let decoded: Recipient = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, Recipient::Player(PlayerId(7)));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{PlayerId, Recipient};

    #[test]
    fn test_decode_rejects_malformed_bytes() {
        let codec = JsonCodec;
        let result: Result<Recipient, _> = codec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let codec = JsonCodec;
        let result: Result<PlayerId, _> = codec.decode(br#""seven""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_is_plain_json() {
        let codec = JsonCodec;
        let bytes = codec.encode(&PlayerId(3)).unwrap();
        assert_eq!(bytes, b"3");
    }
}
