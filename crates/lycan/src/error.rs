//! Unified error type for the Lycan crates.

use lycan_engine::EngineError;
use lycan_protocol::ProtocolError;
use lycan_room::RoomError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LycanError {
    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The game rejected an operation.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl LycanError {
    /// The engine's rejection, wherever it was wrapped.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Engine(err) | Self::Room(RoomError::Game(err)) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lycan_engine::ErrorKind;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let lycan_err: LycanError = err.into();
        assert!(matches!(lycan_err, LycanError::Protocol(_)));
        assert!(lycan_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(lycan_protocol::RoomId(1));
        let lycan_err: LycanError = err.into();
        assert!(matches!(lycan_err, LycanError::Room(_)));
        assert!(lycan_err.engine_error().is_none());
    }

    #[test]
    fn test_engine_error_seen_through_room() {
        let lycan_err: LycanError = RoomError::Game(EngineError::GameOver).into();
        assert_eq!(
            lycan_err.engine_error().map(EngineError::kind),
            Some(ErrorKind::WrongPhase)
        );
    }
}
