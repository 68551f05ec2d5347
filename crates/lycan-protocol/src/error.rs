//! Error types for the protocol layer.
//!
//! Each Lycan crate defines its own error enum. A `ProtocolError` always
//! means the problem is in serialization, never in game rules or rooms.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown role key, or a missing
    /// target field.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
