//! Identity and routing types shared by every Lycan crate.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// A newtype wrapper around `u64` so a `PlayerId` can never be mixed up
/// with a `RoomId` or a `ConnectionRef`.
///
/// `Ord` matters here: the engine picks the wolf leader as the *lowest*
/// living werewolf id, so ids must have a total, deterministic order.
///
/// `#[serde(transparent)]` serializes `PlayerId(42)` as plain `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a room (one game table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// An opaque reference to a transport connection.
///
/// The transport collaborator owns the actual socket. The engine only
/// remembers this handle so a disconnect can be mapped back to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionRef(pub u64);

impl fmt::Display for ConnectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server message.
///
/// Werewolf is a game of hidden information: a seer's check result sent
/// with `All` would ruin the game. Everything the room layer emits is
/// paired with one of these so routing is explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Send to every player in the room.
    All,

    /// Send to one specific player.
    Player(PlayerId),

    /// Send to an explicit group, e.g. the living werewolves.
    Players(Vec<PlayerId>),

    /// Send to everyone EXCEPT the specified player.
    AllExcept(PlayerId),
}

impl Recipient {
    /// Returns `true` if `player` is addressed by this recipient.
    pub fn includes(&self, player: PlayerId) -> bool {
        match self {
            Self::All => true,
            Self::Player(p) => *p == player,
            Self::Players(group) => group.contains(&player),
            Self::AllExcept(excluded) => *excluded != player,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
        assert_eq!(RoomId(3).to_string(), "R-3");
        assert_eq!(ConnectionRef(9).to_string(), "C-9");
    }

    #[test]
    fn test_player_ids_sort_numerically() {
        let mut ids = vec![PlayerId(10), PlayerId(2), PlayerId(7)];
        ids.sort();
        assert_eq!(ids, vec![PlayerId(2), PlayerId(7), PlayerId(10)]);
    }

    #[test]
    fn test_recipient_includes() {
        let p1 = PlayerId(1);
        let p2 = PlayerId(2);
        assert!(Recipient::All.includes(p1));
        assert!(Recipient::Player(p1).includes(p1));
        assert!(!Recipient::Player(p1).includes(p2));
        assert!(Recipient::Players(vec![p1, p2]).includes(p2));
        assert!(!Recipient::Players(vec![p1]).includes(p2));
        assert!(!Recipient::AllExcept(p1).includes(p1));
        assert!(Recipient::AllExcept(p1).includes(p2));
    }

    #[test]
    fn test_recipient_json_shape() {
        let json = serde_json::to_string(&Recipient::Player(PlayerId(5))).unwrap();
        assert_eq!(json, r#"{"Player":5}"#);
        let json = serde_json::to_string(&Recipient::All).unwrap();
        assert_eq!(json, r#""All""#);
    }
}
